//! Coordination core: slot table and protocol.
//!
//! This module contains the embedded implementation of the slotvisor
//! protocol. The public API from this module is [`Coordinator`] (with its
//! [`SlotHandle`]) and the [`CoordinatorBuilder`].
//!
//! Internal modules:
//! - [`slot`]: per-resource occupancy record, queue, and handoff gate;
//! - [`coordinator`]: enter/switch/leave/use orchestration, cycle
//!   detection and rotation;
//! - [`builder`]: validated construction.

mod builder;
mod coordinator;
pub(crate) mod slot;

pub use builder::CoordinatorBuilder;
pub use coordinator::{Coordinator, SlotHandle};
