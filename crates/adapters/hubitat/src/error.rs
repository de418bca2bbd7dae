//! Hubitat adapter error types.

use hubbridge_domain::error::ValidationError;

/// The adapter cannot start with the configuration it was given.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required setting is empty or absent.
    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    /// A URL setting does not parse.
    #[error("setting `{field}` is not a valid URL")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },

    /// A URL setting uses a scheme this adapter cannot talk.
    #[error("setting `{field}` uses unsupported scheme `{scheme}`")]
    UnsupportedScheme { field: &'static str, scheme: String },

    /// A duration setting is zero.
    #[error("setting `{0}` must be greater than zero")]
    Zero(&'static str),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

/// The adapter's event watcher is already running.
///
/// One adapter owns exactly one event-stream connection; a second watcher
/// would publish every hub event twice.
#[derive(Debug, thiserror::Error)]
#[error("event watcher already started for this adapter")]
pub struct WatcherAlreadyStarted;

/// A command did not go through. Never retried by the adapter.
///
/// Targets are always rendered without their query string so the access
/// token cannot leak through error messages.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The device/action pair was rejected before anything was sent.
    #[error("invalid command")]
    Invalid(#[from] ValidationError),

    /// The request could not be completed (connection refused, timeout, …).
    #[error("hub unreachable while sending {target}")]
    Unreachable {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    /// The hub answered with a non-success status.
    #[error("hub rejected {target} with status {status}")]
    Rejected {
        target: String,
        status: reqwest::StatusCode,
    },
}

impl CommandError {
    /// HTTP status reported by the hub, if it answered at all.
    #[must_use]
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_missing_setting() {
        let err = ConfigError::Missing("access_token");
        assert_eq!(err.to_string(), "missing required setting `access_token`");
    }

    #[test]
    fn should_display_rejected_command_with_status() {
        let err = CommandError::Rejected {
            target: "http://hub/devices/42/on".to_string(),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert_eq!(
            err.to_string(),
            "hub rejected http://hub/devices/42/on with status 500 Internal Server Error"
        );
        assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn should_convert_validation_error() {
        let err: CommandError = ValidationError::EmptyAction.into();
        assert!(matches!(err, CommandError::Invalid(_)));
        assert_eq!(err.status(), None);
    }
}
