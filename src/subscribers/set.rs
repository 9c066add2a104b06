//! # SubscriberSet: panic-isolated fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each [`Event`](crate::events::Event) to
//! every subscriber, in registration order, on the emitting thread.
//!
//! ## What it guarantees
//! - Per-emitter FIFO: one thread's events reach each subscriber in
//!   program order.
//! - Panics inside subscribers are caught and logged (isolation).
//!
//! ## What it does **not** guarantee
//! - No global ordering across emitting threads (use `Event::seq`).
//! - No buffering: a slow subscriber slows the emitting user thread.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::events::Event;

use super::Subscribe;

/// Composite fan-out over the registered subscribers.
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a new set.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Returns `true` when no subscribers are registered.
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Fan-out one event to all subscribers.
    ///
    /// A panicking subscriber is logged with its name and skipped; the
    /// remaining subscribers still receive the event.
    pub fn emit(&self, event: &Event) {
        for sub in &self.subs {
            if catch_unwind(AssertUnwindSafe(|| sub.on_event(event))).is_err() {
                log::warn!("subscriber {:?} panicked; event dropped for it", sub.name());
            }
        }
    }
}
