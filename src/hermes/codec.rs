//! JSON codec between MQTT publishes and typed Hermes messages.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::topics;
use super::{Envelope, InboundMessage, OutboundMessage};
use crate::{AppError, Result};

/// Decode an MQTT publish into an [`InboundMessage`].
///
/// # Return value
///
/// - `Ok(message)` for a known topic with a well-formed payload.
/// - `Ok(InboundMessage::Unhandled { .. })` for any topic the reactor has
///   no transition for; the payload is not inspected.
///
/// # Errors
///
/// Returns [`AppError::Codec`] if the payload on a known topic is not valid
/// JSON or is missing a required field.
pub fn decode_inbound(topic: &str, payload: &[u8]) -> Result<InboundMessage> {
    let message = match topic {
        topics::START_CHECKLIST => InboundMessage::StartChecklist(parse(topic, payload)?),
        topics::SESSION_STARTED => InboundMessage::SessionStarted(parse(topic, payload)?),
        topics::SESSION_ENDED => InboundMessage::SessionEnded(parse(topic, payload)?),
        topics::INTENT_NOT_RECOGNIZED => {
            InboundMessage::IntentNotRecognized(parse(topic, payload)?)
        }
        other if topics::intent_name(other).is_some() => {
            InboundMessage::IntentRecognized(parse(topic, payload)?)
        }
        other => {
            debug!(topic = other, "hermes codec: no transition for topic");
            InboundMessage::Unhandled {
                topic: other.to_owned(),
            }
        }
    };

    Ok(message)
}

/// Encode an [`OutboundMessage`] as a topic and compact JSON payload.
///
/// # Errors
///
/// Returns [`AppError::Codec`] if serialization fails.
pub fn encode_outbound(message: &OutboundMessage) -> Result<Envelope> {
    let payload = match message {
        OutboundMessage::BeginSession(msg) => to_json(msg)?,
        OutboundMessage::ContinueSession(msg) => to_json(msg)?,
        OutboundMessage::EndSession(msg) => to_json(msg)?,
        OutboundMessage::ChecklistFinished(msg) => to_json(msg)?,
    };

    Ok(Envelope {
        topic: message.topic().to_owned(),
        payload,
    })
}

fn parse<T: DeserializeOwned>(topic: &str, payload: &[u8]) -> Result<T> {
    serde_json::from_slice(payload)
        .map_err(|err| AppError::Codec(format!("malformed payload on {topic}: {err}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|err| AppError::Codec(format!("failed to serialise outbound message: {err}")))
}
