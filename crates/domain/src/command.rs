//! Command — a validated device action ready to be sent to the hub.
//!
//! A command is addressed as `{device}/{action}[/{secondary}]`. The
//! secondary segment comes from the first caller argument and is made
//! path-safe before it ever reaches a URL builder.

use std::fmt;

use crate::device::HubDevice;
use crate::error::ValidationError;

/// Separator substituted for whitespace inside the secondary segment.
const WHITESPACE_REPLACEMENT: char = '-';
/// Substitute for `?`, which would otherwise start the query string.
const QUERY_REPLACEMENT: char = '.';

/// A single device action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    device_id: String,
    action: String,
    secondary: Option<String>,
}

impl Command {
    /// Build a command from a device, an action name and the caller's
    /// argument list. Only the first argument is used.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyDeviceId`] when the device resolves
    /// to a blank identifier, [`ValidationError::EmptyAction`] when the
    /// action is blank and [`ValidationError::DotSegment`] when any segment
    /// would be read as `.` or `..`.
    pub fn new<D, S>(device: &D, action: &str, args: &[S]) -> Result<Self, ValidationError>
    where
        D: HubDevice + ?Sized,
        S: AsRef<str>,
    {
        let device_id = device.device_id().trim();
        if device_id.is_empty() {
            return Err(ValidationError::EmptyDeviceId);
        }
        let action = action.trim();
        if action.is_empty() {
            return Err(ValidationError::EmptyAction);
        }
        let secondary = args
            .first()
            .map(|arg| sanitize_segment(arg.as_ref()))
            .filter(|segment| !segment.is_empty());

        reject_dot_segment("device_id", device_id)?;
        reject_dot_segment("action", action)?;
        if let Some(segment) = &secondary {
            reject_dot_segment("argument", segment)?;
        }

        Ok(Self {
            device_id: device_id.to_owned(),
            action: action.to_owned(),
            secondary,
        })
    }

    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    #[must_use]
    pub fn secondary(&self) -> Option<&str> {
        self.secondary.as_deref()
    }

    /// Path segments in request order.
    pub fn path_segments(&self) -> impl Iterator<Item = &str> {
        [Some(self.device_id.as_str()), Some(self.action.as_str())]
            .into_iter()
            .chain(std::iter::once(self.secondary.as_deref()))
            .flatten()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device_id, self.action)?;
        if let Some(secondary) = &self.secondary {
            write!(f, "/{secondary}")?;
        }
        Ok(())
    }
}

/// `.` and `..` (also percent-encoded) are path navigation, not names.
fn reject_dot_segment(field: &'static str, segment: &str) -> Result<(), ValidationError> {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    if decoded == "." || decoded == ".." {
        return Err(ValidationError::DotSegment {
            field,
            value: segment.to_owned(),
        });
    }
    Ok(())
}

/// Make a free-form argument usable as a single path segment.
///
/// Whitespace becomes `-` and `?` becomes `.`; surrounding whitespace is
/// dropped first so it does not turn into dangling separators.
#[must_use]
pub fn sanitize_segment(arg: &str) -> String {
    arg.trim()
        .chars()
        .map(|c| match c {
            '?' => QUERY_REPLACEMENT,
            c if c.is_whitespace() => WHITESPACE_REPLACEMENT,
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceRef;

    const NO_ARGS: &[&str] = &[];

    #[test]
    fn should_build_path_with_secondary_from_first_argument() {
        let cmd = Command::new(&DeviceRef::new("42"), "on", &["level 5", "ignored"]).unwrap();
        assert_eq!(cmd.to_string(), "42/on/level-5");
        assert_eq!(
            cmd.path_segments().collect::<Vec<_>>(),
            vec!["42", "on", "level-5"]
        );
    }

    #[test]
    fn should_omit_secondary_without_arguments() {
        let cmd = Command::new("42", "off", NO_ARGS).unwrap();
        assert_eq!(cmd.secondary(), None);
        assert_eq!(cmd.path_segments().collect::<Vec<_>>(), vec!["42", "off"]);
    }

    #[test]
    fn should_trim_device_and_action() {
        let cmd = Command::new(" 42 ", " refresh ", NO_ARGS).unwrap();
        assert_eq!(cmd.device_id(), "42");
        assert_eq!(cmd.action(), "refresh");
    }

    #[test]
    fn should_reject_blank_device_id() {
        let err = Command::new("  ", "on", NO_ARGS).unwrap_err();
        assert_eq!(err, ValidationError::EmptyDeviceId);
    }

    #[test]
    fn should_reject_blank_action() {
        let err = Command::new("42", "", NO_ARGS).unwrap_err();
        assert_eq!(err, ValidationError::EmptyAction);
    }

    #[test]
    fn should_reject_arguments_that_sanitize_to_dot_segments() {
        for (input, value) in [("?", "."), ("??", ".."), (" ? ", ".")] {
            let err = Command::new("42", "setLevel", &[input]).unwrap_err();
            assert_eq!(
                err,
                ValidationError::DotSegment {
                    field: "argument",
                    value: value.to_string(),
                }
            );
        }
    }

    #[test]
    fn should_reject_dot_segment_device_and_action() {
        assert!(matches!(
            Command::new("..", "on", NO_ARGS),
            Err(ValidationError::DotSegment { field: "device_id", .. })
        ));
        assert!(matches!(
            Command::new("42", ".", NO_ARGS),
            Err(ValidationError::DotSegment { field: "action", .. })
        ));
        assert!(matches!(
            Command::new("%2E%2e", "on", NO_ARGS),
            Err(ValidationError::DotSegment { field: "device_id", .. })
        ));
    }

    #[test]
    fn should_keep_arguments_that_only_contain_dots() {
        let cmd = Command::new("42", "speak", &["why?"]).unwrap();
        assert_eq!(cmd.secondary(), Some("why."));
        let cmd = Command::new("42", "setVersion", &["1..2"]).unwrap();
        assert_eq!(cmd.secondary(), Some("1..2"));
    }

    #[test]
    fn should_drop_blank_secondary_argument() {
        let cmd = Command::new("42", "on", &["   "]).unwrap();
        assert_eq!(cmd.secondary(), None);
    }

    #[test]
    fn should_strip_spaces_and_question_marks_from_secondary() {
        let inputs = [
            "set level 5",
            "what?",
            "a ? b",
            "tab\tand\nnewline",
            " padded ",
            "??",
        ];
        for input in inputs {
            let segment = sanitize_segment(input);
            assert!(!segment.contains(' '), "{input:?} -> {segment:?}");
            assert!(!segment.contains('?'), "{input:?} -> {segment:?}");
            assert!(!segment.chars().any(char::is_whitespace));
        }
        assert_eq!(sanitize_segment("what?"), "what.");
        assert_eq!(sanitize_segment(" padded "), "padded");
    }
}
