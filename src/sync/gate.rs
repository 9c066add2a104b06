//! # Binary semaphore with cross-thread release.
//!
//! [`Gate`] is the handoff lock attached to every slot: it serializes the
//! external actions of consecutive occupants. Unlike a mutex, the permit is
//! deliberately not tied to the acquiring thread — the protocol acquires it
//! in one thread (the departing occupant's vacate, or the cycle detector
//! acting for a whole chain of movers) and releases it in another (the
//! successor's first action on its new slot).

use parking_lot::{Condvar, Mutex};

/// Binary semaphore. One permit, blocking acquire, cross-thread release.
pub(crate) struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
}

impl Gate {
    /// Creates a gate with its permit available.
    pub(crate) fn new() -> Self {
        Self {
            open: Mutex::new(true),
            cv: Condvar::new(),
        }
    }

    /// Takes the permit, parking until it is available.
    pub(crate) fn acquire(&self) {
        let mut open = self.open.lock();
        while !*open {
            self.cv.wait(&mut open);
        }
        *open = false;
    }

    /// Returns the permit and wakes one parked acquirer.
    ///
    /// May be called from any thread; releasing a permit that was never
    /// taken is a usage bug (debug-asserted only).
    pub(crate) fn release(&self) {
        let mut open = self.open.lock();
        debug_assert!(!*open, "gate released while its permit was available");
        *open = true;
        self.cv.notify_one();
    }
}
