//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// MQTT client or connection failure.
    Mqtt(String),
    /// Inbound payload could not be decoded, or outbound could not be encoded.
    Codec(String),
    /// Checklist request rejected before any session state was touched.
    InvalidRequest(String),
    /// Unexpected failure while a transition was being processed.
    HandlerFault(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Mqtt(msg) => write!(f, "mqtt: {msg}"),
            Self::Codec(msg) => write!(f, "codec: {msg}"),
            Self::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            Self::HandlerFault(msg) => write!(f, "handler fault: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Codec(format!("malformed json: {err}"))
    }
}

impl From<rumqttc::ClientError> for AppError {
    fn from(err: rumqttc::ClientError) -> Self {
        Self::Mqtt(err.to_string())
    }
}
