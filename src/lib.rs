#![forbid(unsafe_code)]

//! Hermes checklist skill: walks a user through a spoken checklist over MQTT.

pub mod bus;
pub mod config;
pub mod errors;
pub mod hermes;
pub mod models;
pub mod orchestrator;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
