//! Event watcher — keeps one hub event-stream connection alive for the
//! lifetime of the process.
//!
//! ```text
//! Disconnected → Connecting → Open ──(error)──┐
//!       ▲                                      │
//!       └──────────── wait backoff ◀───────────┘
//! ```
//!
//! Failures are handled by kind:
//! - connection-level ([`StreamError`]): log, wait the fixed backoff, reconnect
//! - a payload that does not decode: log and skip, the connection stays open
//! - a panic escaping a connection cycle: log at `error`, wait, reconnect
//!
//! There is no retry cap. The loop only ends through
//! [`WatcherHandle::shutdown`] or [`WatcherHandle::abort`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt as _;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use hubbridge_domain::event::HubEvent;

use crate::ports::{EventConnection, EventPublisher, EventSource, StreamError};

/// Delay between losing the stream and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Lifecycle of the event-stream connection. Only the watcher writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closing,
}

/// How one connection cycle ended.
enum CycleEnd {
    Shutdown,
    Lost(StreamError),
}

/// Reads the hub event stream, decodes each payload into a [`HubEvent`]
/// and hands it to an [`EventPublisher`].
pub struct EventWatcher<S, P> {
    source: S,
    publisher: P,
    reconnect_delay: Duration,
}

impl<S, P> EventWatcher<S, P>
where
    S: EventSource + 'static,
    P: EventPublisher + 'static,
{
    /// Create a watcher with the default 5 second reconnect delay.
    #[must_use]
    pub fn new(source: S, publisher: P) -> Self {
        Self {
            source,
            publisher,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    /// Override the fixed delay applied before every reconnection.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Spawn the watcher on the current tokio runtime.
    ///
    /// Dropping the returned handle does **not** stop the watcher; it keeps
    /// running until the runtime goes away.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn start(self) -> WatcherHandle {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(state_tx, shutdown_rx));

        WatcherHandle {
            state: state_rx,
            shutdown: shutdown_tx,
            task,
        }
    }

    async fn run(
        self,
        state: watch::Sender<ConnectionState>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        tracing::info!(
            reconnect_delay_ms = self.reconnect_delay.as_millis(),
            "event watcher started"
        );

        loop {
            let outcome = AssertUnwindSafe(self.cycle(&state, &mut shutdown))
                .catch_unwind()
                .await;

            match outcome {
                Ok(CycleEnd::Shutdown) => break,
                Ok(CycleEnd::Lost(err)) => {
                    tracing::warn!(
                        error = &err as &dyn std::error::Error,
                        retry_in_ms = self.reconnect_delay.as_millis(),
                        "hub event stream error, retrying"
                    );
                }
                Err(panic) => {
                    tracing::error!(
                        panic = panic_message(&*panic),
                        retry_in_ms = self.reconnect_delay.as_millis(),
                        "event watcher failed unexpectedly, restarting"
                    );
                }
            }

            state.send_replace(ConnectionState::Disconnected);

            tokio::select! {
                () = tokio::time::sleep(self.reconnect_delay) => {}
                () = shutdown_requested(&mut shutdown) => break,
            }
        }

        state.send_replace(ConnectionState::Disconnected);
        tracing::info!("event watcher stopped");
    }

    /// Connect once and pump messages until the connection is lost or a
    /// shutdown is requested.
    async fn cycle(
        &self,
        state: &watch::Sender<ConnectionState>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> CycleEnd {
        state.send_replace(ConnectionState::Connecting);
        tracing::info!("connecting to hub event stream");

        let connected = tokio::select! {
            result = self.source.connect() => result,
            () = shutdown_requested(shutdown) => return CycleEnd::Shutdown,
        };
        let mut connection = match connected {
            Ok(connection) => connection,
            Err(err) => return CycleEnd::Lost(err),
        };

        state.send_replace(ConnectionState::Open);
        tracing::info!("hub event stream open, watching for events");

        loop {
            let received = tokio::select! {
                result = connection.recv() => result,
                () = shutdown_requested(shutdown) => {
                    state.send_replace(ConnectionState::Closing);
                    return CycleEnd::Shutdown;
                }
            };

            match received {
                Ok(payload) => self.deliver(&payload),
                Err(err) => return CycleEnd::Lost(err),
            }
        }
    }

    fn deliver(&self, payload: &str) {
        match HubEvent::from_json(payload) {
            Ok(event) => {
                tracing::debug!(
                    name = %event.name,
                    device_id = ?event.device_id,
                    "hub event received"
                );
                self.publisher.publish(&event);
            }
            Err(err) => {
                tracing::warn!(
                    error = &err as &dyn std::error::Error,
                    payload_len = payload.len(),
                    "skipping undecodable hub event"
                );
            }
        }
    }
}

/// Resolves once shutdown is requested. If the handle was dropped without
/// requesting it, never resolves.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let requested = shutdown.wait_for(|stop| *stop).await.is_ok();
    if !requested {
        std::future::pending::<()>().await;
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Owner's view of a running [`EventWatcher`].
#[derive(Debug)]
pub struct WatcherHandle {
    state: watch::Receiver<ConnectionState>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// A receiver notified on every connection state change.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Whether the background task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Ask the watcher to close its connection and stop, then wait for it.
    pub async fn shutdown(self) {
        self.shutdown.send_replace(true);
        if let Err(err) = self.task.await
            && err.is_panic()
        {
            tracing::error!("event watcher task panicked during shutdown");
        }
    }

    /// Stop the watcher immediately without waiting for it.
    pub fn abort(&self) {
        self.task.abort();
    }
}
