//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `hubbridge.toml` in the working directory. Every field has a
//! default so the file is optional, but the hub endpoints and access token
//! must come from somewhere. Environment variables take precedence over
//! file values.

use hubbridge_adapter_hubitat::{ConfigError as HubitatConfigError, HubitatConfig};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hub connection settings.
    pub hubitat: HubitatConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `hubbridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting hub settings are incomplete.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("hubbridge.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("HUBBRIDGE_BASE_URL") {
            self.hubitat.base_url = val;
        }
        if let Some(val) = lookup("HUBBRIDGE_ACCESS_TOKEN") {
            self.hubitat.access_token = val;
        }
        if let Some(val) = lookup("HUBBRIDGE_EVENT_STREAM_URL") {
            self.hubitat.event_stream_url = val;
        }
        if let Some(secs) = lookup("HUBBRIDGE_RECONNECT_DELAY_SECS").and_then(|v| v.parse().ok())
        {
            self.hubitat.reconnect_delay_secs = secs;
        }
        if let Some(val) = lookup("HUBBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.hubitat.validate()?;
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "hubbridged=info,hubbridge=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Hub settings are missing or malformed.
    #[error("invalid hub configuration")]
    Invalid(#[from] HubitatConfigError),
}
