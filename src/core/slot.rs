//! # Per-resource occupancy record.
//!
//! One [`Slot`] per resource, created at build time, never destroyed. A
//! slot bundles:
//! - **occupancy state** ([`SlotState`]): the occupant, the FIFO queue of
//!   pending requests, and the outgoing `next` link the cycle walk follows;
//! - **turn state** ([`TurnState`]): the predecessor link and the
//!   logical-clock deadlines attached to the current occupancy;
//! - the **handoff gate** serializing `perform()` across consecutive
//!   occupants.
//!
//! ## Locking
//! Occupancy state and turn state sit behind separate locks on purpose.
//! The use path (`begin_use`) must never take the occupancy lock: the
//! cycle detector can hold that lock while waiting on a handoff gate, and
//! the gate is released *by* the use path. The turn lock is a leaf — taken
//! briefly, never held while blocking — which keeps the gate wait acyclic.
//! Lock order where both are needed: occupancy, then turn.
//!
//! State machine per slot: `Free → Occupied → Free`, plus the same-slot
//! refresh self-loop and the rotation `Occupied → Occupied` transition
//! that never passes through `Free`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::ThreadId;

use parking_lot::Mutex;

use crate::resources::ResourceRef;
use crate::sync::{Gate, OneShot};

/// Users are worker threads; the thread id is the user id.
pub(crate) type UserId = ThreadId;

/// What a wake delivers to a parked requester.
///
/// The transfer itself (occupant, predecessor link, occupancy map) is
/// completed by the waking thread before the signal is sent; the grant
/// kind tells the woken thread what remains on its side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grant {
    /// Normal FIFO grant. A woken mover still owns its origin slot and
    /// must vacate it; a woken entrant has nothing left to do.
    Queue,
    /// Grant issued by a cycle rotation. The origin slot's disposition was
    /// part of the same rotation; the woken mover must not touch it.
    Rotation,
}

/// One pending request parked on a slot's queue.
pub(crate) struct Waiter {
    /// The requesting thread.
    pub user: UserId,
    /// Slot the requester currently occupies (`None` for entrants).
    pub from: Option<usize>,
    /// Admission reservation to attach on grant (`Some` for entrants).
    pub entry_deadline: Option<u64>,
    /// Wake signal; the grant kind travels with it.
    pub signal: Arc<OneShot<Grant>>,
}

/// Occupancy state: who holds the slot, who waits for it, and where its
/// occupant wants to go.
pub(crate) struct SlotState {
    /// Current occupant; `None` means Free.
    pub occupant: Option<UserId>,
    /// Outgoing link: the slot this occupant is parked waiting for.
    /// Out-degree ≤ 1, so every cycle is a simple directed cycle.
    pub next: Option<usize>,
    /// Pending requests, FIFO by arrival.
    pub queue: VecDeque<Waiter>,
}

/// Turn state: bookkeeping of the current occupancy, read and written on
/// the use path without the occupancy lock.
pub(crate) struct TurnState {
    /// Slot the current occupant moved from; its handoff gate is released
    /// when this occupant begins its turn.
    pub prev: Option<usize>,
    /// Tenure reservation left by the last completed turn on this slot.
    pub tenure_deadline: Option<u64>,
    /// Entry reservation of an occupant that arrived via `enter` and has
    /// not begun its turn yet.
    pub entry_deadline: Option<u64>,
}

/// One exclusive, reusable slot.
pub(crate) struct Slot {
    pub resource: ResourceRef,
    /// Serializes `perform()` across consecutive occupants. Acquired by
    /// the departing side (vacate, or the cycle detector), released by the
    /// successor's `begin_use`.
    pub handoff: Gate,
    pub state: Mutex<SlotState>,
    pub turn: Mutex<TurnState>,
}

impl Slot {
    pub(crate) fn new(resource: ResourceRef) -> Self {
        Self {
            resource,
            handoff: Gate::new(),
            state: Mutex::new(SlotState {
                occupant: None,
                next: None,
                queue: VecDeque::new(),
            }),
            turn: Mutex::new(TurnState {
                prev: None,
                tenure_deadline: None,
                entry_deadline: None,
            }),
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.resource.name()
    }
}

impl SlotState {
    /// Records `user` as occupant and clears the outgoing link.
    ///
    /// Deadlines are deliberately untouched: they belong to the occupancy
    /// chain, not the occupant, and are settled by the successor's
    /// `begin_use` (or by `leave`).
    pub(crate) fn install(&mut self, user: UserId) {
        self.occupant = Some(user);
        self.next = None;
    }

    /// Clears the occupant and both links. The queue survives.
    pub(crate) fn clear(&mut self) {
        self.occupant = None;
        self.next = None;
    }

    /// Appends a pending request and returns its wake signal.
    pub(crate) fn enqueue(
        &mut self,
        user: UserId,
        from: Option<usize>,
        entry_deadline: Option<u64>,
    ) -> Arc<OneShot<Grant>> {
        let signal = Arc::new(OneShot::new());
        self.queue.push_back(Waiter {
            user,
            from,
            entry_deadline,
            signal: Arc::clone(&signal),
        });
        signal
    }

    /// FIFO pop.
    pub(crate) fn pop_waiter(&mut self) -> Option<Waiter> {
        self.queue.pop_front()
    }

    /// Removes and returns the request whose origin is `origin`.
    ///
    /// Used during cycle resolution to pull exactly the request that
    /// closes the loop, wherever it sits in the queue. At most one such
    /// request can exist (a user parks on one slot at a time).
    pub(crate) fn take_waiter_from(&mut self, origin: usize) -> Option<Waiter> {
        let pos = self.queue.iter().position(|w| w.from == Some(origin))?;
        self.queue.remove(pos)
    }
}
