//! Hermes dialogue manager and NLU messages exchanged with the platform.
//!
//! Field names follow the Hermes wire format (camelCase JSON). Only the
//! fields the checklist skill reads or writes are modelled; unknown inbound
//! fields are ignored by serde.

use serde::{Deserialize, Serialize};

use super::checklist::default_site_id;

/// Initial action of a new dialogue session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DialogueAction {
    /// Text spoken when the session starts.
    pub text: String,
    /// Intents the recognizer is restricted to.
    pub intent_filter: Vec<String>,
    /// Whether the session may wait behind another one on the same site.
    pub can_be_enqueued: bool,
    /// Whether to publish `intentNotRecognized` instead of ending the session.
    pub send_intent_not_recognized: bool,
}

/// Session initialisation payload, tagged by `type` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionInit {
    /// Session that expects an intent in response.
    Action(DialogueAction),
}

/// `hermes/dialogueManager/startSession`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DialogueStartSession {
    /// How the session begins.
    pub init: SessionInit,
    /// Correlation token echoed back in `sessionStarted`.
    pub custom_data: Option<String>,
    /// Site the session runs on.
    pub site_id: String,
}

/// `hermes/dialogueManager/continueSession`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DialogueContinueSession {
    /// Platform session to continue.
    pub session_id: String,
    /// Text spoken before listening again.
    pub text: String,
    /// Intents the recognizer is restricted to.
    pub intent_filter: Vec<String>,
    /// Whether to publish `intentNotRecognized` instead of ending the session.
    pub send_intent_not_recognized: bool,
}

/// `hermes/dialogueManager/endSession`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DialogueEndSession {
    /// Platform session to end.
    pub session_id: String,
    /// Closing text.
    pub text: String,
}

/// `hermes/dialogueManager/sessionStarted`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DialogueSessionStarted {
    /// Session id assigned by the dialogue manager.
    pub session_id: String,
    /// Site the session runs on.
    #[serde(default = "default_site_id")]
    pub site_id: String,
    /// Correlation token from `startSession`.
    #[serde(default)]
    pub custom_data: Option<String>,
}

/// Reason a dialogue session ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TerminationReason {
    /// Session ended normally.
    Nominal,
    /// User aborted the session.
    AbortedByUser,
    /// Recognizer could not match an intent.
    IntentNotRecognized,
    /// Session timed out waiting for input.
    Timeout,
    /// Platform-side error.
    Error,
    /// Reason not known to this skill.
    #[serde(other)]
    Other,
}

/// Termination details carried by `sessionEnded`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionTermination {
    /// Why the session ended.
    pub reason: TerminationReason,
}

/// `hermes/dialogueManager/sessionEnded`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DialogueSessionEnded {
    /// Session that ended.
    pub session_id: String,
    /// Site the session ran on.
    #[serde(default = "default_site_id")]
    pub site_id: String,
    /// Correlation token from `startSession`.
    #[serde(default)]
    pub custom_data: Option<String>,
    /// Termination details.
    pub termination: SessionTermination,
}

/// `hermes/dialogueManager/intentNotRecognized`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DialogueIntentNotRecognized {
    /// Session the utterance belongs to.
    pub session_id: String,
    /// Site the utterance came from.
    #[serde(default = "default_site_id")]
    pub site_id: String,
    /// Transcribed input, when available.
    #[serde(default)]
    pub input: Option<String>,
    /// Correlation token from `startSession`.
    #[serde(default)]
    pub custom_data: Option<String>,
}

/// Recognized intent name and confidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    /// Intent name, also the last segment of the topic.
    pub intent_name: String,
    /// Recognizer confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence_score: f32,
}

/// `hermes/intent/<intentName>`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NluIntent {
    /// Transcribed input.
    #[serde(default)]
    pub input: String,
    /// Recognized intent.
    pub intent: Intent,
    /// Site the utterance came from.
    #[serde(default = "default_site_id")]
    pub site_id: String,
    /// Session the utterance belongs to.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Correlation token from `startSession`.
    #[serde(default)]
    pub custom_data: Option<String>,
}
