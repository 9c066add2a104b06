//! # Single-use blocking handoff.
//!
//! [`OneShot`] parks one thread until another delivers a value. It is the
//! wake vehicle everywhere a thread waits on another thread's progress:
//! deferred entrants wait on a `OneShot<()>`, parked movers and entrants
//! wait on a `OneShot<Grant>` whose payload tells them what kind of
//! transfer woke them.
//!
//! ## Rules
//! - **One send per instance.** The contract is enforced at call sites,
//!   not detected here; a `debug_assert!` documents it in debug builds.
//! - **Send-before-wait is safe**: the wait returns immediately with the
//!   stored value.
//! - **No error path**: the wait loops on the payload slot, so a condvar
//!   wakeup without a delivered value simply parks again.

use parking_lot::{Condvar, Mutex};

/// Single-use wait/send handoff carrying a payload.
///
/// The thread calling [`send`](OneShot::send) is, by convention at each call
/// site, transferring a grant it owns to the woken thread; the payload type
/// makes that transfer explicit instead of leaving it to a comment.
pub(crate) struct OneShot<T> {
    slot: Mutex<Option<T>>,
    cv: Condvar,
}

impl<T> OneShot<T> {
    /// Creates an armed (blocking) handoff.
    pub(crate) fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            cv: Condvar::new(),
        }
    }

    /// Delivers the payload and wakes the waiter.
    ///
    /// Never blocks. Calling this more than once per instance is a usage
    /// bug; the primitive does not detect it in release builds.
    pub(crate) fn send(&self, value: T) {
        let mut slot = self.slot.lock();
        debug_assert!(slot.is_none(), "one-shot handoff sent twice");
        *slot = Some(value);
        self.cv.notify_one();
    }

    /// Parks the calling thread until the payload arrives, then returns it.
    ///
    /// Returns immediately if [`send`](OneShot::send) already ran.
    pub(crate) fn wait(&self) -> T {
        let mut slot = self.slot.lock();
        loop {
            if let Some(value) = slot.take() {
                return value;
            }
            self.cv.wait(&mut slot);
        }
    }
}
