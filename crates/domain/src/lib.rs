//! # hubbridge-domain
//!
//! Pure domain model for the hubbridge hub adapter.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Hub events** (state-change notifications pushed by the hub)
//! - Define **Device references** (the opaque handles callers pass in)
//! - Define **Commands** (validated device/action/argument triples)
//! - Contain all invariant enforcement and wire decoding of events
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod attribute_value;
pub mod command;
pub mod device;
pub mod error;
pub mod event;
pub mod id;
pub mod time;
