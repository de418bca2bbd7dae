//! In-process event bus backed by a list of subscriber callbacks.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use hubbridge_domain::event::HubEvent;
use hubbridge_domain::id::SubscriptionId;

use crate::ports::EventPublisher;

/// Error a subscriber callback may return. It is logged and otherwise ignored.
pub type SubscriberError = Box<dyn std::error::Error + Send + Sync>;

type Callback = Arc<dyn Fn(&HubEvent) -> Result<(), SubscriberError> + Send + Sync>;

/// Returned by channel subscribers when the receiver lags behind.
#[derive(Debug, thiserror::Error)]
#[error("subscriber channel is full, event dropped")]
pub struct ChannelFull;

/// In-process event bus.
///
/// [`publish`](EventPublisher::publish) calls every registered callback
/// synchronously, in registration order. A callback that errors or panics
/// is logged and skipped; the remaining callbacks still run.
///
/// Callbacks run on the publisher's task and must return quickly. Slow or
/// async consumers should use [`subscribe_channel`](Self::subscribe_channel).
///
/// Publishing succeeds even when there are no subscribers (the event is
/// simply dropped).
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<(SubscriptionId, Callback)>>,
}

impl EventBus {
    /// Create an empty event bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked for every event published *after* this
    /// call returns.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&HubEvent) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.subscribers.write().push((id, Arc::new(callback)));
        tracing::debug!(subscription = %id, "event subscriber registered");
        id
    }

    /// Subscribe through a bounded channel.
    ///
    /// Events are forwarded with `try_send`: when the receiver falls
    /// `capacity` events behind, new events are dropped for it (and a
    /// warning is logged) instead of stalling the publisher. Once the
    /// receiver is dropped, events are discarded silently until
    /// [`unsubscribe`](Self::unsubscribe) is called.
    pub fn subscribe_channel(&self, capacity: usize) -> (SubscriptionId, mpsc::Receiver<HubEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        let id = self.subscribe(move |event| match tx.try_send(event.clone()) {
            Ok(()) | Err(mpsc::error::TrySendError::Closed(_)) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(ChannelFull.into()),
        });
        (id, rx)
    }

    /// Remove a subscriber. Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        let removed = subscribers.len() != before;
        if removed {
            tracing::debug!(subscription = %id, "event subscriber removed");
        }
        removed
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl EventPublisher for EventBus {
    fn publish(&self, event: &HubEvent) {
        // Snapshot so callbacks may (un)subscribe without deadlocking.
        let snapshot = self.subscribers.read().clone();

        for (id, callback) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| callback(event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(
                        subscription = %id,
                        %err,
                        event = %event.name,
                        "event subscriber failed"
                    );
                }
                Err(_) => {
                    tracing::error!(
                        subscription = %id,
                        event = %event.name,
                        "event subscriber panicked"
                    );
                }
            }
        }
    }
}
