//! Checklist reactor — routes inbound events to session transitions.
//!
//! The reactor owns the [`ChecklistSession`] and processes one event at a
//! time: filter by site, run the matching transition, then publish every
//! emitted message in order before taking the next event.
//!
//! Failures stay inside the reactor. A rejected request or a panicking
//! transition is logged and yields no emissions; the loop keeps running.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::checklist_session::ChecklistSession;
use crate::bus::MessageBus;
use crate::hermes::codec::encode_outbound;
use crate::hermes::{InboundMessage, OutboundMessage};
use crate::{AppError, Result};

/// Set of sites the skill answers; empty means every site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteFilter {
    site_ids: Vec<String>,
}

impl SiteFilter {
    /// Filter restricted to `site_ids`.
    #[must_use]
    pub fn new(site_ids: Vec<String>) -> Self {
        Self { site_ids }
    }

    /// Whether a message from `site_id` should reach the session.
    ///
    /// Messages without a site are always let through.
    #[must_use]
    pub fn allows(&self, site_id: Option<&str>) -> bool {
        match site_id {
            Some(site) if !self.site_ids.is_empty() => self.site_ids.iter().any(|id| id == site),
            _ => true,
        }
    }
}

/// Dispatch layer around a single [`ChecklistSession`].
#[derive(Debug, Default)]
pub struct Reactor {
    session: ChecklistSession,
    sites: SiteFilter,
}

impl Reactor {
    /// Idle reactor answering the given sites.
    #[must_use]
    pub fn new(sites: SiteFilter) -> Self {
        Self {
            session: ChecklistSession::new(),
            sites,
        }
    }

    /// Session state, for inspection.
    #[must_use]
    pub fn session(&self) -> &ChecklistSession {
        &self.session
    }

    /// Run the transition for `message` and return what it emits.
    ///
    /// Never fails: rejected requests, unknown messages, and handler faults
    /// are logged and produce an empty list.
    pub fn dispatch(&mut self, message: InboundMessage) -> Vec<OutboundMessage> {
        if !self.sites.allows(message.site_id()) {
            debug!(site_id = ?message.site_id(), "message for another site");
            return Vec::new();
        }

        let kind = message.kind();
        let outcome = isolate(|| self.transition(message));

        match outcome {
            Ok(emitted) => emitted,
            Err(err @ AppError::InvalidRequest(_)) => {
                warn!(kind, %err, "checklist request rejected");
                Vec::new()
            }
            Err(err) => {
                error!(kind, %err, "transition failed");
                Vec::new()
            }
        }
    }

    fn transition(&mut self, message: InboundMessage) -> Result<Vec<OutboundMessage>> {
        let emitted = match message {
            InboundMessage::StartChecklist(request) => self.session.start(request)?,
            InboundMessage::SessionStarted(msg) => self.session.session_started(&msg),
            InboundMessage::IntentRecognized(msg) => self.session.intent_recognized(&msg),
            InboundMessage::IntentNotRecognized(msg) => self.session.intent_not_recognized(&msg),
            InboundMessage::SessionEnded(msg) => self.session.session_ended(&msg),
            InboundMessage::Unhandled { topic } => {
                warn!(topic, "unexpected message");
                Vec::new()
            }
        };
        Ok(emitted)
    }
}

/// Reactor task — consumes inbound events and publishes the emissions.
///
/// Each event is fully handled, including all publishes, before the next
/// one is received. Encoding or publish failures are logged and do not stop
/// the loop.
///
/// Returns the reactor when `cancel` fires or `event_rx` closes.
pub async fn run_reactor(
    mut reactor: Reactor,
    mut event_rx: mpsc::Receiver<InboundMessage>,
    bus: Arc<dyn MessageBus>,
    cancel: CancellationToken,
) -> Reactor {
    loop {
        let message = tokio::select! {
            biased;

            () = cancel.cancelled() => {
                info!("checklist reactor shutting down");
                break;
            }

            maybe_message = event_rx.recv() => {
                if let Some(m) = maybe_message { m } else {
                    info!("inbound event channel closed");
                    break;
                }
            }
        };

        for outbound in reactor.dispatch(message) {
            let envelope = match encode_outbound(&outbound) {
                Ok(envelope) => envelope,
                Err(err) => {
                    error!(topic = outbound.topic(), %err, "failed to encode outbound message");
                    continue;
                }
            };

            let topic = envelope.topic.clone();
            if let Err(err) = bus.publish(envelope).await {
                warn!(topic, %err, "failed to publish outbound message");
            }
        }
    }

    reactor
}

/// Run `transition`, turning a panic into [`AppError::HandlerFault`].
///
/// # Errors
///
/// Returns whatever `transition` returns, or `AppError::HandlerFault`
/// carrying the panic message if it panicked.
pub fn isolate<F>(transition: F) -> Result<Vec<OutboundMessage>>
where
    F: FnOnce() -> Result<Vec<OutboundMessage>>,
{
    panic::catch_unwind(AssertUnwindSafe(transition))
        .unwrap_or_else(|payload| Err(AppError::HandlerFault(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "transition panicked".into())
}
