//! Message bus abstraction.
//!
//! The [`MessageBus`] trait decouples the checklist reactor from the
//! transport that carries Hermes messages. The production implementation
//! is [`mqtt::MqttBus`]; tests substitute an in-memory recorder.

pub mod mqtt;

use std::future::Future;
use std::pin::Pin;

use crate::hermes::Envelope;
use crate::Result;

/// Outbound side of the publish/subscribe bus.
///
/// Publishing is fire-and-forget from the reactor's point of view: the
/// returned future resolves once the message is handed to the transport,
/// not when the broker acknowledges it.
pub trait MessageBus: Send + Sync {
    /// Publish one encoded message.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Mqtt`](crate::AppError::Mqtt) if the transport
    /// refuses the message (for example because the client has shut down).
    fn publish(&self, envelope: Envelope) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
