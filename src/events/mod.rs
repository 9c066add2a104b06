//! Coordination events: types and classification.
//!
//! This module holds the event **data model** for everything the
//! coordinator reports about occupancy turnover: entries, switches, cycle
//! rotations, departures, and the serialized external actions.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publisher**: the [`Coordinator`](crate::Coordinator), always after
//!   dropping its coordination locks.
//! - **Consumers**: the [`SubscriberSet`](crate::SubscriberSet), which fans
//!   each event out to user subscribers synchronously.

mod event;

pub use event::{Event, EventKind};
