//! Hub event — one state-change notification pushed by the hub.
//!
//! Events arrive as JSON objects on the event stream. Only `name` is
//! required; every other known field is optional, and fields this type
//! does not know about are kept in [`HubEvent::extra`] rather than
//! rejected.

use serde::{Deserialize, Deserializer, Serialize};

use crate::attribute_value::AttributeValue;
use crate::error::DecodeError;
use crate::time::{Timestamp, now};

/// A decoded state-change notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubEvent {
    /// Origin of the event (`DEVICE`, `LOCATION`, `HUB`, …).
    #[serde(default)]
    pub source: Option<String>,
    /// Identifier of the device that changed, when the source is a device.
    #[serde(default, deserialize_with = "loose_id")]
    pub device_id: Option<String>,
    /// Attribute name (`switch`, `level`, `temperature`, …).
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// New attribute value.
    #[serde(default)]
    pub value: Option<AttributeValue>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub description_text: Option<String>,
    /// Physical vs digital trigger, as reported by the hub.
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "loose_id")]
    pub hub_id: Option<String>,
    #[serde(default, deserialize_with = "loose_id")]
    pub installed_app_id: Option<String>,
    /// When the change happened, or when it was received if the hub did
    /// not say.
    #[serde(default = "now", alias = "date", deserialize_with = "loose_timestamp")]
    pub timestamp: Timestamp,
    /// Every field not modelled above, untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl HubEvent {
    /// Decode one event payload.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the payload is not a JSON object or is
    /// missing the attribute name.
    pub fn from_json(payload: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(payload).map_err(DecodeError)
    }

    /// Key under which the latest value of this attribute is cached.
    ///
    /// `"{device_id}.{name}"` for device events, `"{source}.{name}"` for
    /// everything else.
    #[must_use]
    pub fn state_key(&self) -> String {
        let scope = self
            .device_id
            .as_deref()
            .or(self.source.as_deref())
            .unwrap_or("hub");
        format!("{scope}.{}", self.name)
    }
}

/// Identifiers arrive as numbers from the hub but as strings from some
/// apps; both are kept as strings.
fn loose_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Int(value) => value.to_string(),
        Raw::Str(value) => value,
    }))
}

/// Accept RFC 3339, the hub's `+0000` offset style, or epoch milliseconds.
/// Anything else falls back to the receive time instead of failing the
/// whole event.
fn loose_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match raw {
        Some(serde_json::Value::String(text)) => chrono::DateTime::parse_from_rfc3339(&text)
            .or_else(|_| chrono::DateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f%z"))
            .ok()
            .map(|ts| ts.with_timezone(&chrono::Utc)),
        Some(serde_json::Value::Number(millis)) => millis
            .as_i64()
            .and_then(chrono::DateTime::from_timestamp_millis),
        _ => None,
    };
    Ok(parsed.unwrap_or_else(now))
}
