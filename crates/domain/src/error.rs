//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts via `#[from]`.
//! The domain only knows about invariant violations and payload decoding.

/// A domain invariant was violated while building a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The device reference resolved to an empty identifier.
    #[error("device identifier must not be empty")]
    EmptyDeviceId,

    /// The action name was empty or whitespace only.
    #[error("action name must not be empty")]
    EmptyAction,

    /// A path segment was `.` or `..`, which URL builders resolve away.
    #[error("{field} must not be a dot segment, got {value:?}")]
    DotSegment { field: &'static str, value: String },
}

/// A single inbound event payload could not be decoded.
///
/// Never a connection-level failure: the message is skipped and the
/// stream keeps going.
#[derive(Debug, thiserror::Error)]
#[error("failed to decode hub event")]
pub struct DecodeError(#[source] pub serde_json::Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_validation_errors() {
        assert_eq!(
            ValidationError::EmptyDeviceId.to_string(),
            "device identifier must not be empty"
        );
        assert_eq!(
            ValidationError::EmptyAction.to_string(),
            "action name must not be empty"
        );
        assert_eq!(
            ValidationError::DotSegment {
                field: "argument",
                value: "..".to_string(),
            }
            .to_string(),
            r#"argument must not be a dot segment, got "..""#
        );
    }

    #[test]
    fn should_keep_json_error_as_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{{bad").unwrap_err();
        let err = DecodeError(json_err);
        assert_eq!(err.to_string(), "failed to decode hub event");
        assert!(std::error::Error::source(&err).is_some());
    }
}
