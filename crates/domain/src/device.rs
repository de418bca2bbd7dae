//! Device references — the opaque handles callers pass to the dispatcher.
//!
//! Devices are not owned by this workspace. Whatever a caller uses to model
//! a device only has to resolve to the stable identifier the hub knows it by.

use serde::{Deserialize, Serialize};

/// Anything that can be addressed on the hub.
pub trait HubDevice {
    /// The identifier the hub uses in command paths (e.g. `"42"`).
    fn device_id(&self) -> &str;
}

impl HubDevice for str {
    fn device_id(&self) -> &str {
        self
    }
}

impl HubDevice for String {
    fn device_id(&self) -> &str {
        self
    }
}

impl<T: HubDevice + ?Sized> HubDevice for &T {
    fn device_id(&self) -> &str {
        (**self).device_id()
    }
}

/// A plain device reference with optional capability context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRef {
    /// Hub-side device identifier.
    pub id: String,
    /// Human-readable label, if the caller has one.
    #[serde(default)]
    pub label: Option<String>,
    /// Capabilities the caller believes the device supports (e.g. `"Switch"`).
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl DeviceRef {
    /// Create a reference to the device with the given hub identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            capabilities: Vec::new(),
        }
    }

    /// Attach a human-readable label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Declare a capability.
    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    /// Whether the caller declared the given capability (case-insensitive).
    #[must_use]
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities
            .iter()
            .any(|known| known.eq_ignore_ascii_case(capability))
    }
}

impl HubDevice for DeviceRef {
    fn device_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_resolve_id_from_device_ref() {
        let device = DeviceRef::new("42").with_label("Kitchen");
        assert_eq!(device.device_id(), "42");
        assert_eq!(device.label.as_deref(), Some("Kitchen"));
    }

    #[test]
    fn should_resolve_id_from_plain_strings() {
        assert_eq!("17".device_id(), "17");
        assert_eq!(String::from("18").device_id(), "18");
    }

    #[test]
    fn should_match_capabilities_case_insensitively() {
        let device = DeviceRef::new("42").with_capability("SwitchLevel");
        assert!(device.has_capability("switchlevel"));
        assert!(!device.has_capability("ColorControl"));
    }

    #[test]
    fn should_deserialize_with_missing_optional_fields() {
        let device: DeviceRef = serde_json::from_str(r#"{"id": "9"}"#).unwrap();
        assert_eq!(device, DeviceRef::new("9"));
    }
}
