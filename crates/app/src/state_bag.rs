//! State bag — the adapter's last-known-state cache.
//!
//! A concurrent string-keyed map. Writes are last-write-wins per key and
//! each entry is replaced as a whole, so readers never observe a partial
//! value. No eviction, no expiry, no persistence.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use hubbridge_domain::attribute_value::AttributeValue;
use hubbridge_domain::event::HubEvent;

use crate::event_bus::SubscriberError;

/// Concurrent key → value store shared by the dispatcher, the watcher and
/// subscriber callbacks.
///
/// Construct one per adapter and pass it (usually as `Arc<StateBag>`) to
/// whatever needs it.
#[derive(Debug, Default)]
pub struct StateBag {
    entries: DashMap<String, Value>,
}

impl StateBag {
    /// Create an empty state bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Visible to every other caller as soon as this returns.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Snapshot of the keys currently present.
    #[must_use]
    pub fn keys(&self) -> HashSet<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of cached keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cache the value carried by a hub event under its
    /// [`state_key`](HubEvent::state_key). Events without a value store
    /// `null`.
    pub fn record_event(&self, event: &HubEvent) {
        let value = event
            .value
            .as_ref()
            .map_or(Value::Null, AttributeValue::to_json);
        self.set(event.state_key(), value);
    }

    /// An [`EventBus`](crate::event_bus::EventBus) callback that mirrors
    /// every published event into this bag.
    pub fn mirror_subscriber(
        self: &Arc<Self>,
    ) -> impl Fn(&HubEvent) -> Result<(), SubscriberError> + Send + Sync + 'static {
        let bag = Arc::clone(self);
        move |event: &HubEvent| {
            bag.record_event(event);
            Ok(())
        }
    }
}
