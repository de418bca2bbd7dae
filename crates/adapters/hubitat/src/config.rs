//! Hubitat integration configuration.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Configuration for the Hubitat integration.
///
/// `base_url` points at the Maker API devices endpoint, e.g.
/// `http://192.168.1.10/apps/api/143/devices`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct HubitatConfig {
    /// Maker API base URL; commands are appended as path segments.
    pub base_url: String,
    /// Maker API access token. Never logged.
    pub access_token: String,
    /// WebSocket URL of the hub event stream, e.g. `ws://192.168.1.10/eventsocket`.
    pub event_stream_url: String,
    /// Fixed delay before reconnecting the event stream, in seconds.
    pub reconnect_delay_secs: u64,
    /// Timeout for a single command request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for HubitatConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            access_token: String::new(),
            event_stream_url: String::new(),
            reconnect_delay_secs: 5,
            request_timeout_secs: 10,
        }
    }
}

impl fmt::Debug for HubitatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubitatConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .field("event_stream_url", &self.event_stream_url)
            .field("reconnect_delay_secs", &self.reconnect_delay_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Parsed and checked endpoints.
#[derive(Debug, Clone)]
pub(crate) struct Endpoints {
    pub base_url: Url,
    pub event_stream_url: Url,
}

impl HubitatConfig {
    /// Check that every required setting is present and well-formed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoints().map(|_| ())
    }

    pub(crate) fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        let base_url = parse_url("base_url", &self.base_url, &["http", "https"])?;
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::Missing("access_token"));
        }
        let event_stream_url = parse_url("event_stream_url", &self.event_stream_url, &["ws"])?;
        if self.reconnect_delay_secs == 0 {
            return Err(ConfigError::Zero("reconnect_delay_secs"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Zero("request_timeout_secs"));
        }
        Ok(Endpoints {
            base_url,
            event_stream_url,
        })
    }

    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_url(field: &'static str, raw: &str, schemes: &[&str]) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::Missing(field));
    }
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })?;
    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::UnsupportedScheme {
            field,
            scheme: url.scheme().to_owned(),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> HubitatConfig {
        HubitatConfig {
            base_url: "http://192.168.1.10/apps/api/143/devices".to_string(),
            access_token: "secret-token".to_string(),
            event_stream_url: "ws://192.168.1.10/eventsocket".to_string(),
            ..HubitatConfig::default()
        }
    }

    #[test]
    fn should_have_sensible_defaults() {
        let config = HubitatConfig::default();
        assert_eq!(config.reconnect_delay(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.base_url.is_empty());
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            base_url = "http://hub.local/apps/api/1/devices"
            access_token = "abc"
            event_stream_url = "ws://hub.local/eventsocket"
            reconnect_delay_secs = 2
            request_timeout_secs = 3
        "#;
        let config: HubitatConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url, "http://hub.local/apps/api/1/devices");
        assert_eq!(config.access_token, "abc");
        assert_eq!(config.event_stream_url, "ws://hub.local/eventsocket");
        assert_eq!(config.reconnect_delay_secs, 2);
        assert_eq!(config.request_timeout_secs, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let config: HubitatConfig = toml::from_str(r#"access_token = "abc""#).unwrap();
        assert_eq!(config.reconnect_delay_secs, 5);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn should_accept_valid_config() {
        let endpoints = valid().endpoints().unwrap();
        assert_eq!(endpoints.base_url.host_str(), Some("192.168.1.10"));
        assert_eq!(endpoints.event_stream_url.scheme(), "ws");
    }

    #[test]
    fn should_reject_missing_settings() {
        let mut config = valid();
        config.base_url = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("base_url"))
        ));

        let mut config = valid();
        config.access_token = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("access_token"))
        ));

        let mut config = valid();
        config.event_stream_url = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("event_stream_url"))
        ));
    }

    #[test]
    fn should_reject_malformed_url() {
        let mut config = valid();
        config.base_url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl {
                field: "base_url",
                ..
            })
        ));
    }

    #[test]
    fn should_reject_wrong_schemes() {
        let mut config = valid();
        config.base_url = "ws://hub.local/devices".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedScheme {
                field: "base_url",
                ..
            })
        ));

        let mut config = valid();
        config.event_stream_url = "http://hub.local/eventsocket".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedScheme {
                field: "event_stream_url",
                ..
            })
        ));
    }

    #[test]
    fn should_reject_zero_durations() {
        let mut config = valid();
        config.reconnect_delay_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Zero("reconnect_delay_secs"))
        ));

        let mut config = valid();
        config.request_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Zero("request_timeout_secs"))
        ));
    }

    #[test]
    fn should_redact_token_in_debug_output() {
        let debug = format!("{:?}", valid());
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("192.168.1.10"));
    }
}
