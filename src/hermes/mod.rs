//! Hermes message routing: topic table, inbound decoding, outbound encoding.
//!
//! # Inbound topics
//!
//! | Topic                                         | Maps to                                  |
//! |-----------------------------------------------|------------------------------------------|
//! | `rhasspy/checklist/start`                     | [`InboundMessage::StartChecklist`]       |
//! | `hermes/dialogueManager/sessionStarted`       | [`InboundMessage::SessionStarted`]       |
//! | `hermes/intent/<name>`                        | [`InboundMessage::IntentRecognized`]     |
//! | `hermes/dialogueManager/intentNotRecognized`  | [`InboundMessage::IntentNotRecognized`]  |
//! | `hermes/dialogueManager/sessionEnded`         | [`InboundMessage::SessionEnded`]         |
//! | *(any other)*                                 | [`InboundMessage::Unhandled`]            |

pub mod codec;
pub mod topics;

use crate::models::checklist::{ChecklistFinished, StartChecklist};
use crate::models::dialogue::{
    DialogueContinueSession, DialogueEndSession, DialogueIntentNotRecognized,
    DialogueSessionEnded, DialogueSessionStarted, DialogueStartSession, NluIntent,
};

/// Event consumed by the checklist reactor.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Request to run a new checklist.
    StartChecklist(StartChecklist),
    /// Dialogue manager confirmed a session start.
    SessionStarted(DialogueSessionStarted),
    /// NLU recognized an intent.
    IntentRecognized(NluIntent),
    /// Utterance did not match the session's intent filter.
    IntentNotRecognized(DialogueIntentNotRecognized),
    /// Dialogue manager ended a session.
    SessionEnded(DialogueSessionEnded),
    /// Message on a topic the reactor has no transition for.
    Unhandled {
        /// Topic the message arrived on.
        topic: String,
    },
}

impl InboundMessage {
    /// Site the message originates from, when it carries one.
    #[must_use]
    pub fn site_id(&self) -> Option<&str> {
        match self {
            Self::StartChecklist(msg) => Some(&msg.site_id),
            Self::SessionStarted(msg) => Some(&msg.site_id),
            Self::IntentRecognized(msg) => Some(&msg.site_id),
            Self::IntentNotRecognized(msg) => Some(&msg.site_id),
            Self::SessionEnded(msg) => Some(&msg.site_id),
            Self::Unhandled { .. } => None,
        }
    }

    /// Short label used in log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StartChecklist(_) => "start_checklist",
            Self::SessionStarted(_) => "session_started",
            Self::IntentRecognized(_) => "intent_recognized",
            Self::IntentNotRecognized(_) => "intent_not_recognized",
            Self::SessionEnded(_) => "session_ended",
            Self::Unhandled { .. } => "unhandled",
        }
    }
}

/// Message emitted by a checklist transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Ask the first item in a new dialogue session.
    BeginSession(DialogueStartSession),
    /// Ask the next item, or repeat the current one.
    ContinueSession(DialogueContinueSession),
    /// Close the dialogue session with the end text.
    EndSession(DialogueEndSession),
    /// Report the checklist outcome.
    ChecklistFinished(ChecklistFinished),
}

impl OutboundMessage {
    /// MQTT topic the message is published on.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::BeginSession(_) => topics::START_SESSION,
            Self::ContinueSession(_) => topics::CONTINUE_SESSION,
            Self::EndSession(_) => topics::END_SESSION,
            Self::ChecklistFinished(_) => topics::CHECKLIST_FINISHED,
        }
    }
}

/// Encoded message ready for the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Destination topic.
    pub topic: String,
    /// JSON payload bytes.
    pub payload: Vec<u8>,
}
