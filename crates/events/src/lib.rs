//! Event system for section-sync
//!
//! This crate provides the event bus and event types used to broadcast
//! status changes, fetch outcomes and notifications to interested consumers.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;
