//! Hermes and checklist MQTT topic names.

/// Checklist start request.
pub const START_CHECKLIST: &str = "rhasspy/checklist/start";
/// Checklist outcome report.
pub const CHECKLIST_FINISHED: &str = "rhasspy/checklist/finished";

/// Dialogue manager: begin a session.
pub const START_SESSION: &str = "hermes/dialogueManager/startSession";
/// Dialogue manager: continue a session.
pub const CONTINUE_SESSION: &str = "hermes/dialogueManager/continueSession";
/// Dialogue manager: end a session.
pub const END_SESSION: &str = "hermes/dialogueManager/endSession";
/// Dialogue manager: session started notification.
pub const SESSION_STARTED: &str = "hermes/dialogueManager/sessionStarted";
/// Dialogue manager: session ended notification.
pub const SESSION_ENDED: &str = "hermes/dialogueManager/sessionEnded";
/// Dialogue manager: utterance did not match the intent filter.
pub const INTENT_NOT_RECOGNIZED: &str = "hermes/dialogueManager/intentNotRecognized";

/// Prefix of every recognized-intent topic.
pub const INTENT_PREFIX: &str = "hermes/intent/";
/// Wildcard filter for all recognized intents.
pub const ALL_INTENTS: &str = "hermes/intent/#";

/// Topic filters the checklist skill subscribes to.
pub const SUBSCRIPTIONS: [&str; 5] = [
    START_CHECKLIST,
    ALL_INTENTS,
    SESSION_STARTED,
    SESSION_ENDED,
    INTENT_NOT_RECOGNIZED,
];

/// Intent name carried in a `hermes/intent/<name>` topic, if `topic` is one.
#[must_use]
pub fn intent_name(topic: &str) -> Option<&str> {
    topic
        .strip_prefix(INTENT_PREFIX)
        .filter(|name| !name.is_empty())
}
