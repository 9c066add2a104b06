//! Entry-fairness gate: logical clock, reservations, parked entrants.
//!
//! This module bounds how far a new entrant may cut in line ahead of users
//! already present. Every active hold (an occupant, or an entrant still on
//! its way in) carries one reservation — a logical-clock deadline by which
//! it is guaranteed, at worst, to have released. An entrant whose arrival
//! order lies beyond the minimum outstanding deadline must wait: some
//! earlier hold is already due and gets to clear first.
//!
//! ## Contents
//! - [`Admission`] the gate itself, whose `reserve` hands each entrant a
//!   reservation (arrival sequence, deadline, and an optional park signal)

mod controller;

pub(crate) use controller::Admission;
