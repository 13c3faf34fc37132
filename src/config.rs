//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::{AppError, Result};

/// Environment variable consulted when no MQTT username is configured.
pub const USERNAME_ENV: &str = "MQTT_USERNAME";
/// Environment variable consulted when no MQTT password is configured.
pub const PASSWORD_ENV: &str = "MQTT_PASSWORD";

/// MQTT broker connectivity settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct MqttConfig {
    /// Broker host name.
    #[serde(default = "default_host")]
    pub host: String,
    /// Broker port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Optional username.
    #[serde(default)]
    pub username: Option<String>,
    /// Optional password; requires `username`.
    #[serde(default)]
    pub password: Option<String>,
    /// Keep-alive interval sent to the broker.
    #[serde(default = "default_keep_alive_seconds")]
    pub keep_alive_seconds: u64,
    /// Delay before polling again after a connection error.
    #[serde(default = "default_reconnect_delay_seconds")]
    pub reconnect_delay_seconds: u64,
    /// Prefix of the generated MQTT client id.
    #[serde(default = "default_client_id_prefix")]
    pub client_id_prefix: String,
}

fn default_host() -> String {
    "localhost".into()
}

fn default_port() -> u16 {
    1883
}

fn default_keep_alive_seconds() -> u64 {
    30
}

fn default_reconnect_delay_seconds() -> u64 {
    5
}

fn default_client_id_prefix() -> String {
    "checklist".into()
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: None,
            password: None,
            keep_alive_seconds: default_keep_alive_seconds(),
            reconnect_delay_seconds: default_reconnect_delay_seconds(),
            client_id_prefix: default_client_id_prefix(),
        }
    }
}

/// Global configuration parsed from an optional `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Broker connectivity.
    #[serde(default)]
    pub mqtt: MqttConfig,
    /// Sites this skill serves; empty means every site.
    #[serde(default)]
    pub site_ids: Vec<String>,
    /// Capacity of the inbound event channel feeding the reactor.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            mqtt: MqttConfig::default(),
            site_ids: Vec::new(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Broker host.
    pub host: Option<String>,
    /// Broker port.
    pub port: Option<u16>,
    /// Broker username.
    pub username: Option<String>,
    /// Broker password.
    pub password: Option<String>,
    /// Site filter; replaces the configured list when non-empty.
    pub site_ids: Vec<String>,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides and re-validate.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the merged configuration is invalid.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<()> {
        if let Some(host) = overrides.host {
            self.mqtt.host = host;
        }
        if let Some(port) = overrides.port {
            self.mqtt.port = port;
        }
        if overrides.username.is_some() {
            self.mqtt.username = overrides.username;
        }
        if overrides.password.is_some() {
            self.mqtt.password = overrides.password;
        }
        if !overrides.site_ids.is_empty() {
            self.site_ids = overrides.site_ids;
        }
        self.validate()
    }

    /// Fill missing MQTT credentials from `MQTT_USERNAME` / `MQTT_PASSWORD`.
    ///
    /// Values already present in the configuration are kept.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the result is a password without a
    /// username.
    pub fn load_credentials(&mut self) -> Result<()> {
        if self.mqtt.username.is_none() {
            self.mqtt.username = env::var(USERNAME_ENV).ok().filter(|v| !v.is_empty());
        }
        if self.mqtt.password.is_none() {
            self.mqtt.password = env::var(PASSWORD_ENV).ok().filter(|v| !v.is_empty());
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.mqtt.host.trim().is_empty() {
            return Err(AppError::Config("mqtt.host must not be empty".into()));
        }

        if self.mqtt.port == 0 {
            return Err(AppError::Config(
                "mqtt.port must be greater than zero".into(),
            ));
        }

        if self.mqtt.keep_alive_seconds < 5 {
            return Err(AppError::Config(
                "mqtt.keep_alive_seconds must be at least 5".into(),
            ));
        }

        if self.mqtt.password.is_some() && self.mqtt.username.is_none() {
            return Err(AppError::Config(
                "mqtt.password requires mqtt.username".into(),
            ));
        }

        if self.site_ids.iter().any(|site| site.trim().is_empty()) {
            return Err(AppError::Config("site_ids must not contain blanks".into()));
        }

        if self.channel_capacity == 0 {
            return Err(AppError::Config(
                "channel_capacity must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
