//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers
//! into the coordinator. Handlers run inline on the coordinating thread.
//!
//! ## Contract
//! - Implementations must be **brief**: the emitting thread is a user
//!   thread in the middle of a coordination call.
//! - Implementations must **not** call back into the coordinator from
//!   `on_event` (the calling thread may be about to park).
//! - Panics inside a handler are caught by the
//!   [`SubscriberSet`](crate::SubscriberSet) and logged; they never poison
//!   the coordination path.

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called synchronously from the thread that completed the coordination
/// step, after all coordination locks are dropped.
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    ///
    /// # Parameters
    /// - `event`: Reference to the event (does not transfer ownership)
    fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
