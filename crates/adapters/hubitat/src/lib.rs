//! # hubbridge-adapter-hubitat
//!
//! Hubitat adapter — bridges a Hubitat hub into hubbridge.
//!
//! ## How it works
//!
//! - **Commands** go out through the hub's Maker API as a single HTTP GET
//!   per action (see [`ActionDispatcher`]).
//! - **Events** come in over the hub's WebSocket `eventsocket`, which the
//!   [`EventWatcher`](hubbridge_app::watcher::EventWatcher) keeps open for
//!   the lifetime of the process, reconnecting after a fixed delay whenever
//!   it drops.
//! - Decoded events are republished on an [`EventBus`]; a [`StateBag`]
//!   is provided for callers that want to cache last-known values.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `hubbridge-app` and `hubbridge-domain`.

mod config;
mod dispatcher;
mod error;
mod stream;

pub use config::HubitatConfig;
pub use dispatcher::ActionDispatcher;
pub use error::{CommandError, ConfigError, WatcherAlreadyStarted};
pub use stream::{WebSocketConnection, WebSocketSource};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use url::Url;

use hubbridge_app::event_bus::EventBus;
use hubbridge_app::ports::HomeAutomationPlatform;
use hubbridge_app::state_bag::StateBag;
use hubbridge_app::watcher::{EventWatcher, WatcherHandle};
use hubbridge_domain::device::HubDevice;

/// A configured connection to one Hubitat hub.
///
/// Construction only validates configuration and builds the HTTP client;
/// no network traffic happens until a command is sent or the watcher is
/// started.
pub struct HubitatAdapter {
    dispatcher: ActionDispatcher,
    event_stream_url: Url,
    reconnect_delay: Duration,
    state: Arc<StateBag>,
    events: Arc<EventBus>,
    watcher_started: AtomicBool,
}

impl HubitatAdapter {
    /// Build an adapter from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required setting is missing or
    /// malformed, or if the HTTP client cannot be built.
    pub fn new(config: &HubitatConfig) -> Result<Self, ConfigError> {
        let endpoints = config.endpoints()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            dispatcher: ActionDispatcher::new(
                client,
                endpoints.base_url,
                config.access_token.trim(),
            ),
            event_stream_url: endpoints.event_stream_url,
            reconnect_delay: config.reconnect_delay(),
            state: Arc::new(StateBag::new()),
            events: Arc::new(EventBus::new()),
            watcher_started: AtomicBool::new(false),
        })
    }

    /// Build an adapter and immediately start its event watcher.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn connect(config: &HubitatConfig) -> Result<(Self, WatcherHandle), ConfigError> {
        let adapter = Self::new(config)?;
        adapter.watcher_started.store(true, Ordering::Release);
        let watcher = adapter.spawn_watcher();
        Ok((adapter, watcher))
    }

    /// Spawn the event watcher, publishing into this adapter's [`EventBus`].
    ///
    /// # Errors
    ///
    /// Returns [`WatcherAlreadyStarted`] if this adapter already has a
    /// watcher, even one that has since been shut down.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start_watcher(&self) -> Result<WatcherHandle, WatcherAlreadyStarted> {
        if self.watcher_started.swap(true, Ordering::AcqRel) {
            tracing::warn!("refusing to start a second hub event watcher");
            return Err(WatcherAlreadyStarted);
        }
        Ok(self.spawn_watcher())
    }

    fn spawn_watcher(&self) -> WatcherHandle {
        tracing::info!(
            url = %dispatcher::redact(&self.event_stream_url),
            reconnect_delay_secs = self.reconnect_delay.as_secs(),
            "starting hub event watcher"
        );
        EventWatcher::new(
            WebSocketSource::new(self.event_stream_url.clone()),
            Arc::clone(&self.events),
        )
        .with_reconnect_delay(self.reconnect_delay)
        .start()
    }

    /// Shared handle on the state bag.
    #[must_use]
    pub fn shared_state(&self) -> Arc<StateBag> {
        Arc::clone(&self.state)
    }

    /// Shared handle on the event bus.
    #[must_use]
    pub fn shared_events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }
}

impl HomeAutomationPlatform for HubitatAdapter {
    type Error = CommandError;

    async fn do_action<D, S>(&self, device: &D, action: &str, args: &[S]) -> Result<(), CommandError>
    where
        D: HubDevice + Sync + ?Sized,
        S: AsRef<str> + Sync,
    {
        self.dispatcher.dispatch(device, action, args).await
    }

    fn state_bag(&self) -> &StateBag {
        &self.state
    }

    fn events(&self) -> &EventBus {
        &self.events
    }
}
