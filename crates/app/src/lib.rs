//! # hubbridge-app
//!
//! Application layer — the parts of the hub adapter that have real
//! lifecycle and failure handling, plus the **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `EventSource` / `EventConnection` — open and read the hub event stream
//!   - `EventPublisher` — fan decoded events out to subscribers
//!   - `HomeAutomationPlatform` — command a hub and observe its state
//! - Provide **in-process infrastructure** that doesn't need IO:
//!   - `EventBus` — callback subscribers with failure isolation
//!   - `StateBag` — concurrent last-known-state cache
//! - Run the **event watcher**: connect, decode, publish, reconnect forever
//!
//! ## Dependency rule
//! Depends on `hubbridge-domain` only (plus `tokio` for tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod state_bag;
pub mod watcher;
