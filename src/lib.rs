//! # slotvisor
//!
//! **Slotvisor** coordinates concurrent access by many worker threads to a
//! fixed set of exclusive, reusable slots.
//!
//! A user (one per thread) joins by occupying a chosen slot, may later move
//! to a different slot, or depart entirely. Each slot holds at most one
//! occupant; moving into an occupied slot means waiting. The crate solves
//! the two problems that make this hard:
//!
//! - **cyclic waits**: when X waits for the slot held by Y, who waits for
//!   the slot held by Z, who waits for the slot held by X, the whole cycle
//!   is detected and rotated one step atomically — nobody is forced to
//!   vacate into a Free state, and nobody deadlocks;
//! - **starvation**: a logical-clock admission window bounds how far new
//!   entrants can cut in line ahead of users already present.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     user thread A       user thread B       user thread C
//!     enter/switch/leave  enter/switch/leave  enter/switch/leave
//!            ▼                   ▼                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Coordinator                                                      │
//! │  - Admission (logical clock, reservation deadlines)               │
//! │  - occupied map (user → slot)                                     │
//! │  - detection section (one cycle walk at a time)                   │
//! └──────┬──────────────────┬──────────────────┬──────────────┬───────┘
//!        ▼                  ▼                  ▼              │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐  │
//!     │  Slot "a"    │   │  Slot "b"    │   │  Slot "c"    │  │
//!     │ occupant     │   │ occupant     │   │ occupant     │  │
//!     │ FIFO queue   │   │ FIFO queue   │   │ FIFO queue   │  │
//!     │ next-link ───┼──►│ next-link ───┼──►│ handoff gate │  │
//!     └──────────────┘   └──────────────┘   └──────────────┘  │
//!                                                             ▼
//!                                                      SubscriberSet
//!                                                    (events fan-out)
//! ```
//!
//! ### Lifecycle of one user
//! ```text
//! enter(name)
//!   ├─► admission reserve ── window exceeded? ──► park until admissible
//!   ├─► slot free?     occupy
//!   └─► slot occupied? park FIFO ──► woken with the transfer complete
//!
//! handle.begin_use()           (exactly once per occupancy turn)
//!   ├─► release predecessor's handoff, settle deadlines
//!   ├─► wait for prior occupant's action to finish
//!   ├─► Resource::perform()
//!   └─► register fresh tenure deadline
//!
//! switch_to(name) ... begin_use() ... switch_to(name) ... begin_use() ...
//!
//! leave()
//!   └─► hand slot to first waiter (or mark Free), settle deadlines
//! ```
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                  |
//! |-------------------|-------------------------------------------------------------------|-------------------------------------|
//! | **Coordination**  | Enter, switch, leave over a fixed slot table.                     | [`Coordinator`], [`SlotHandle`]     |
//! | **Resources**     | The opaque exclusive units being guarded.                         | [`Resource`], [`ResourceFn`]        |
//! | **Subscriber API**| Hook into coordination events (logging, metrics, custom).         | [`Subscribe`], [`SubscriberSet`]    |
//! | **Errors**        | Construction validation and fatal-fault taxonomy.                 | [`BuildError`], [`Fault`]           |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use slotvisor::{Coordinator, ResourceFn};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let coordinator = Coordinator::builder()
//!         .add_resource(ResourceFn::arc("lathe", || {
//!             // operate the lathe...
//!         }))
//!         .add_resource(ResourceFn::arc("press", || {
//!             // operate the press...
//!         }))
//!         .build()?;
//!
//!     // Each user runs on its own thread; uncontended calls complete
//!     // immediately.
//!     let handle = coordinator.enter("lathe");
//!     handle.begin_use();
//!
//!     let handle = coordinator.switch_to("press");
//!     handle.begin_use();
//!
//!     coordinator.leave();
//!     Ok(())
//! }
//! ```
//!
//! ## Contract
//! - Call [`SlotHandle::begin_use`] exactly once per `enter`/`switch_to`,
//!   before the next operation from the same thread.
//! - Waits are never abandoned: there is no cancellation, and every wait is
//!   eventually released by another thread's progress (given every
//!   [`Resource::perform`] eventually returns).
//! - Contract violations (unknown names, operating without entering) are
//!   precondition faults and panic; see [`Fault`].

mod admission;
mod core;
mod error;
mod events;
mod resources;
mod subscribers;
mod sync;

// ---- Public re-exports ----

pub use crate::core::{Coordinator, CoordinatorBuilder, SlotHandle};
pub use error::{BuildError, Fault};
pub use events::{Event, EventKind};
pub use resources::{Resource, ResourceFn, ResourceRef};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
