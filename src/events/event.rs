//! # Coordination events emitted by the coordinator.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Entry events**: admission and slot acquisition on the way in
//! - **Movement events**: switches between slots, including cycle rotations
//! - **Turn events**: the serialized external action and final departure
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! slot and user names, origin slots, and admission sequence numbers.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Events from one thread appear in program order; `seq`
//! restores a total order across threads.
//!
//! ## Example
//! ```rust
//! use slotvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::Switched)
//!     .with_user("worker-3")
//!     .with_slot("press")
//!     .with_from("lathe");
//!
//! assert_eq!(ev.kind, EventKind::Switched);
//! assert_eq!(ev.slot.as_deref(), Some("press"));
//! assert_eq!(ev.from.as_deref(), Some("lathe"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of coordination events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Entry events ===
    /// An entrant was held back by the admission window.
    ///
    /// Sets:
    /// - `user`: entrant's thread name/id
    /// - `slot`: target slot name
    /// - `arrival`: admission arrival sequence
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    EnterDeferred,

    /// An admitted entrant found its slot occupied and joined the queue.
    ///
    /// Sets:
    /// - `user`: entrant's thread name/id
    /// - `slot`: target slot name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    EnterQueued,

    /// A user now occupies a slot it entered from outside.
    ///
    /// Sets:
    /// - `user`: occupant's thread name/id
    /// - `slot`: occupied slot name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Entered,

    // === Movement events ===
    /// A switching user found its target occupied and joined the queue.
    ///
    /// Sets:
    /// - `user`: mover's thread name/id
    /// - `slot`: target slot name
    /// - `from`: origin slot name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SwitchQueued,

    /// A user now occupies the slot it switched to (any path: free target,
    /// same-slot refresh, queue grant, or cycle rotation).
    ///
    /// Sets:
    /// - `user`: mover's thread name/id
    /// - `slot`: new slot name
    /// - `from`: origin slot name (equal to `slot` on a refresh)
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Switched,

    /// A closed chain of pending switches was resolved as one rotation.
    ///
    /// Sets:
    /// - `user`: the detecting mover's thread name/id
    /// - `slot`: the detecting mover's target slot name
    /// - `cycle_len`: number of slots rotated
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    CycleRotated,

    // === Turn events ===
    /// An occupant's external action is about to run (handoff acquired).
    ///
    /// Sets:
    /// - `user`: occupant's thread name/id
    /// - `slot`: slot name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    UseStarted,

    /// An occupant's external action returned (handoff released).
    ///
    /// Sets:
    /// - `user`: occupant's thread name/id
    /// - `slot`: slot name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    UseFinished,

    /// A user departed, vacating its slot.
    ///
    /// Sets:
    /// - `user`: departing thread name/id
    /// - `slot`: vacated slot name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Left,
}

/// Coordination event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Event classification.
    pub kind: EventKind,
    /// Thread name (or debug id) of the acting user, if applicable.
    pub user: Option<Arc<str>>,
    /// Name of the slot acted on, if applicable.
    pub slot: Option<Arc<str>>,
    /// Name of the origin slot, for movement events.
    pub from: Option<Arc<str>>,
    /// Admission arrival sequence, for entry events.
    pub arrival: Option<u64>,
    /// Number of slots rotated, for [`EventKind::CycleRotated`].
    pub cycle_len: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and
    /// next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            user: None,
            slot: None,
            from: None,
            arrival: None,
            cycle_len: None,
        }
    }

    /// Attaches the acting user's name.
    #[inline]
    pub fn with_user(mut self, user: impl Into<Arc<str>>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Attaches a slot name.
    #[inline]
    pub fn with_slot(mut self, slot: impl Into<Arc<str>>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// Attaches an origin slot name.
    #[inline]
    pub fn with_from(mut self, from: impl Into<Arc<str>>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Attaches an admission arrival sequence.
    #[inline]
    pub fn with_arrival(mut self, arrival: u64) -> Self {
        self.arrival = Some(arrival);
        self
    }

    /// Attaches a rotated-cycle length.
    #[inline]
    pub fn with_cycle_len(mut self, len: usize) -> Self {
        self.cycle_len = Some(len);
        self
    }
}
