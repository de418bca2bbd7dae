//! Event bus port — fan-out of decoded hub events.

use hubbridge_domain::event::HubEvent;

/// Publishes hub events to interested subscribers.
///
/// Publishing is synchronous and infallible from the caller's point of
/// view: whatever goes wrong inside a subscriber stays there.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: &HubEvent);
}

impl<T: EventPublisher + ?Sized> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: &HubEvent) {
        (**self).publish(event);
    }
}
