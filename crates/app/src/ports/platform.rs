//! Platform port — what an automation sees of a connected hub.

use std::future::Future;

use hubbridge_domain::device::HubDevice;

use crate::event_bus::EventBus;
use crate::state_bag::StateBag;

/// A hub the application can command and observe.
///
/// Implementations live in adapter crates (e.g. `hubbridge-adapter-hubitat`).
pub trait HomeAutomationPlatform: Send + Sync {
    /// Error returned when a command does not go through.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send one action to a device. Only the first argument is used.
    ///
    /// Exactly one request is attempted; retrying is up to the caller.
    fn do_action<D, S>(
        &self,
        device: &D,
        action: &str,
        args: &[S],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send
    where
        D: HubDevice + Sync + ?Sized,
        S: AsRef<str> + Sync;

    /// Last-known state shared by the whole adapter.
    fn state_bag(&self) -> &StateBag;

    /// Where hub events are republished.
    fn events(&self) -> &EventBus;
}
