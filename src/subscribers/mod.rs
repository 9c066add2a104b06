//! # Event subscribers for the slotvisor coordinator.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! that fans coordination events out to user-defined handlers.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Coordinator ── emit(&Event) ──► SubscriberSet
//!                                        │
//!                                   ┌────┴────┬─────────┬───────┐
//!                                   ▼         ▼         ▼       ▼
//!                                 LogWriter  Metrics  Custom   ...
//! ```
//!
//! Dispatch is synchronous: the thread that completed a coordination step
//! delivers the event to every subscriber before returning to its caller,
//! always after the coordinator has dropped its locks. Handlers must
//! therefore be brief and must not call back into the coordinator.
//!
//! ## Implementing custom subscribers
//! ```rust
//! use slotvisor::{Subscribe, Event, EventKind};
//!
//! struct RotationCounter;
//!
//! impl Subscribe for RotationCounter {
//!     fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::CycleRotated {
//!             // increment a counter...
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
