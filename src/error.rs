//! Error types used by the slotvisor coordinator.
//!
//! This module defines two enums:
//!
//! - [`BuildError`] — errors raised while constructing a coordinator.
//! - [`Fault`] — fatal conditions detected at coordination time.
//!
//! `BuildError` is the only recoverable error in the crate: the resource set
//! is validated once, at construction. After that, every operation either
//! eventually succeeds or the process is in an invariant-violated state —
//! [`Fault`] values are used as panic payloads, never returned.

use thiserror::Error;

/// # Errors produced while building a [`Coordinator`](crate::Coordinator).
///
/// The resource set is fixed at construction; these are the only checks
/// that can fail.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The builder was given no resources.
    #[error("coordinator needs at least one resource")]
    NoResources,

    /// Two resources share the same name.
    #[error("duplicate resource name: {name:?}")]
    DuplicateResource {
        /// The colliding name.
        name: String,
    },
}

impl BuildError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BuildError::NoResources => "build_no_resources",
            BuildError::DuplicateResource { .. } => "build_duplicate_resource",
        }
    }
}

/// # Fatal coordination faults.
///
/// Each variant is either a caller contract violation (an operation invoked
/// from a thread that is not entitled to it) or a broken internal invariant.
/// Neither is recoverable: retrying cannot restore lost handoff ownership,
/// so the offending thread panics with the matching variant as the message.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// An operation named a resource the coordinator was not built with.
    #[error("unknown resource: {name:?}")]
    UnknownResource {
        /// The unresolved name.
        name: String,
    },

    /// `switch_to` or `leave` was called from a thread that holds no slot.
    #[error("calling thread occupies no slot (enter first)")]
    NotOccupying,

    /// A reservation was released at a deadline with no outstanding entry.
    #[error("no outstanding reservation at deadline {deadline}")]
    UnbalancedRelease {
        /// The deadline that had no reservation.
        deadline: u64,
    },

    /// A cycle rotation found no queued request from the expected origin.
    ///
    /// The detection walk only follows links recorded by parked movers, so
    /// every consecutive pair on a detected cycle must have a matching
    /// queue entry.
    #[error("no queued request from slot {origin} during rotation")]
    MissingCycleWaiter {
        /// Index of the origin slot whose request was expected.
        origin: usize,
    },
}

impl Fault {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use slotvisor::Fault;
    ///
    /// let f = Fault::NotOccupying;
    /// assert_eq!(f.as_label(), "fault_not_occupying");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Fault::UnknownResource { .. } => "fault_unknown_resource",
            Fault::NotOccupying => "fault_not_occupying",
            Fault::UnbalancedRelease { .. } => "fault_unbalanced_release",
            Fault::MissingCycleWaiter { .. } => "fault_missing_cycle_waiter",
        }
    }
}
