//! # Windowed admission control.
//!
//! [`Admission`] keeps a logical clock (one tick per entry attempt) and a
//! multiset of reservation deadlines, one per currently active hold. Each
//! reservation is valued `arrival + window`, where `window = 2N − 1` for N
//! slots — the worst-case number of ticks before that hold must have
//! released.
//!
//! ## Rules
//! - An entrant whose arrival sequence exceeds the minimum outstanding
//!   deadline is **parked**: an earlier hold is already due, and letting
//!   the entrant proceed would make its overtaking unbounded.
//! - Every release is the single re-evaluation point: it recomputes the
//!   minimum and wakes parked entrants, in arrival order, while still
//!   holding the admission lock (no missed wakeups).
//! - Adding a reservation never wakes anyone: a fresh hold can only shrink
//!   the set of admissible entrants.
//!
//! The `2N − 1` window is preserved exactly as verified; changing it
//! changes the starvation-freedom argument.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use parking_lot::Mutex;

use crate::error::Fault;
use crate::sync::OneShot;

/// Outcome of one entry attempt.
pub(crate) struct Reservation {
    /// Arrival sequence drawn from the logical clock.
    pub arrival: u64,
    /// Deadline registered for this hold (`arrival + window`).
    pub deadline: u64,
    /// Present when the entrant must wait before proceeding.
    pub parked: Option<Arc<OneShot<()>>>,
}

struct AdmissionInner {
    /// Deadline → number of holds reserved at it.
    reservations: BTreeMap<u64, usize>,
    /// Arrival sequence → wake signal, for entrants held back.
    parked: BTreeMap<u64, Arc<OneShot<()>>>,
}

/// Global entry-fairness gate.
pub(crate) struct Admission {
    clock: AtomicU64,
    window: u64,
    inner: Mutex<AdmissionInner>,
}

impl Admission {
    /// Creates the gate for a table of `slot_count` slots.
    pub(crate) fn new(slot_count: usize) -> Self {
        Self {
            clock: AtomicU64::new(0),
            window: 2 * slot_count as u64 - 1,
            inner: Mutex::new(AdmissionInner {
                reservations: BTreeMap::new(),
                parked: BTreeMap::new(),
            }),
        }
    }

    /// Current logical-clock value.
    pub(crate) fn clock(&self) -> u64 {
        self.clock.load(AtomicOrdering::SeqCst)
    }

    /// The fairness window (`2N − 1`).
    pub(crate) fn window(&self) -> u64 {
        self.window
    }

    /// Claims an arrival sequence and registers this entrant's reservation.
    ///
    /// When the returned [`Reservation`] carries a `parked` signal, the
    /// entrant is not yet admissible and must wait on it before touching
    /// any slot. Its reservation is already in the multiset either way.
    pub(crate) fn reserve(&self) -> Reservation {
        let mut inner = self.inner.lock();

        let arrival = self.clock.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        let deadline = arrival + self.window;
        *inner.reservations.entry(deadline).or_insert(0) += 1;

        // The entrant's own deadline always exceeds its arrival, so a
        // smaller minimum belongs to an earlier hold that is already due.
        let min_deadline = inner.reservations.keys().next().copied();
        let parked = match min_deadline {
            Some(min) if min < arrival => {
                let signal = Arc::new(OneShot::new());
                inner.parked.insert(arrival, Arc::clone(&signal));
                Some(signal)
            }
            _ => None,
        };

        Reservation {
            arrival,
            deadline,
            parked,
        }
    }

    /// Adds one reservation at `deadline` (a fresh tenure). Never wakes.
    pub(crate) fn register(&self, deadline: u64) {
        let mut inner = self.inner.lock();
        *inner.reservations.entry(deadline).or_insert(0) += 1;
    }

    /// Removes one reservation at `deadline` and re-evaluates admission.
    ///
    /// Wakes, in increasing arrival order, every parked entrant whose
    /// arrival now lies at or below the minimum outstanding deadline; with
    /// no reservations left, wakes everyone. Runs entirely under the
    /// admission lock.
    pub(crate) fn release(&self, deadline: u64) {
        let mut inner = self.inner.lock();

        let remaining = match inner.reservations.get_mut(&deadline) {
            Some(count) => {
                *count -= 1;
                *count
            }
            None => panic!("{}", Fault::UnbalancedRelease { deadline }),
        };
        if remaining == 0 {
            inner.reservations.remove(&deadline);
        }

        match inner.reservations.keys().next().copied() {
            Some(min) => {
                while inner
                    .parked
                    .first_key_value()
                    .is_some_and(|(&arrival, _)| arrival <= min)
                {
                    if let Some((_, signal)) = inner.parked.pop_first() {
                        signal.send(());
                    }
                }
            }
            None => {
                let all = std::mem::take(&mut inner.parked);
                for (_, signal) in all {
                    signal.send(());
                }
            }
        }
    }
}
