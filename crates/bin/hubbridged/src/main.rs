//! # hubbridged — hubbridge daemon
//!
//! Composition root that connects to a Hubitat hub and keeps its event
//! stream flowing.
//!
//! ## Responsibilities
//! - Load configuration (`hubbridge.toml`, env vars)
//! - Install the tracing subscriber
//! - Build the Hubitat adapter
//! - Subscribe the event logger and the state mirror
//! - Start the event watcher and stop it on Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use hubbridge_adapter_hubitat::HubitatAdapter;
use hubbridge_app::event_bus::SubscriberError;
use hubbridge_app::ports::HomeAutomationPlatform;
use hubbridge_app::state_bag::StateBag;
use hubbridge_app::watcher::ConnectionState;
use hubbridge_domain::event::HubEvent;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();
    tracing::info!(hubitat = ?config.hubitat, "starting hubbridged");

    let adapter = HubitatAdapter::new(&config.hubitat)?;
    wire_subscribers(&adapter, &adapter.shared_state());

    let watcher = adapter.start_watcher()?;
    tokio::spawn(log_connection_changes(watcher.state_changes()));

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    watcher.shutdown().await;

    tracing::info!(tracked = adapter.state_bag().len(), "hubbridged stopped");
    Ok(())
}

/// Attach the daemon's own consumers to any platform's event bus.
fn wire_subscribers<P: HomeAutomationPlatform>(platform: &P, state: &Arc<StateBag>) {
    platform.events().subscribe(state.mirror_subscriber());
    platform.events().subscribe(log_event);
}

#[allow(clippy::unnecessary_wraps)]
fn log_event(event: &HubEvent) -> Result<(), SubscriberError> {
    tracing::debug!(
        device_id = event.device_id.as_deref(),
        name = %event.name,
        value = ?event.value,
        source = event.source.as_deref(),
        "hub event"
    );
    Ok(())
}

async fn log_connection_changes(mut changes: watch::Receiver<ConnectionState>) {
    while changes.changed().await.is_ok() {
        let state = *changes.borrow_and_update();
        tracing::info!(?state, "event stream connection state changed");
    }
}
