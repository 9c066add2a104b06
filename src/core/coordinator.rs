//! # Coordinator: occupancy orchestration.
//!
//! The [`Coordinator`] owns the fixed slot table and runs the whole
//! protocol: windowed admission on entry, FIFO queueing on busy slots,
//! deadlock-free resolution of cyclic switch chains, and the handoff
//! discipline that serializes external actions per slot.
//!
//! ## Operation flow
//! ```text
//! enter(name):
//!   ├─► Admission::reserve() ──► parked? wait on admission signal
//!   ├─► target free? install, attach entry deadline
//!   └─► target busy? enqueue (FIFO) ──► wait ──► transfer done by waker
//!
//! switch_to(name):
//!   ├─► same slot      → refresh, done
//!   ├─► target free    → install (prev = old) ──► vacate(old)
//!   └─► target busy    → detection section ──► walk next-links from target
//!         ├─► chain ends at old → CYCLE: rotate every slot one step,
//!         │     waking each parked mover with Grant::Rotation;
//!         │     no slot in the chain ever becomes Free
//!         └─► chain ends elsewhere → link old→target, enqueue, wait
//!               ├─► Grant::Queue    → vacate(old) myself
//!               └─► Grant::Rotation → old was rotated away, done
//!
//! leave():
//!   └─► settle deadlines ──► vacate(slot) ──► release handoff gate
//! ```
//!
//! ## Rules
//! - A granted waiter resumes with the transfer **already complete**: the
//!   waking thread installs the occupant, predecessor link, entry
//!   deadline, and occupancy-map entry before signalling. No slot is ever
//!   observable Free across a grant.
//! - Only one cycle detection runs at a time (one global section); the
//!   section never blocks traffic on slots outside the walked chain.
//! - Outside the section, the `next`-link graph is acyclic: every cycle is
//!   resolved inside the same critical section that closed it.
//! - Lock order: detection section → occupancy locks (chain order) → turn
//!   locks → admission/signal internals. Handoff gates may be waited on
//!   while occupancy locks are held; gate releases only ever take the leaf
//!   turn lock, which keeps those waits acyclic.
//!
//! ## Caller contract
//! - A thread must `enter` before `switch_to`/`leave`, and must call
//!   [`SlotHandle::begin_use`] exactly once per occupancy turn. Violations
//!   are precondition faults ([`Fault`]), not recoverable errors.
//! - Waits are never abandoned; there is no cancellation path.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};

use crate::admission::Admission;
use crate::core::slot::{Grant, Slot, SlotState, UserId};
use crate::error::Fault;
use crate::events::{Event, EventKind};
use crate::resources::ResourceRef;
use crate::subscribers::SubscriberSet;
use crate::sync::OneShot;

/// Coordinates exclusive access to a fixed set of slots.
///
/// One instance per resource set, built once via
/// [`CoordinatorBuilder`](crate::CoordinatorBuilder); users are worker
/// threads calling [`enter`](Coordinator::enter),
/// [`switch_to`](Coordinator::switch_to) and
/// [`leave`](Coordinator::leave). There is no teardown: the slot table
/// lives as long as the coordinator.
pub struct Coordinator {
    slots: Vec<Slot>,
    by_name: HashMap<String, usize>,
    /// user → index of the slot it currently occupies.
    occupied: DashMap<UserId, usize>,
    admission: Admission,
    /// Global cycle-detection section: at most one walk at a time.
    detection: Mutex<()>,
    subscribers: SubscriberSet,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("slots", &self.slots.len())
            .finish_non_exhaustive()
    }
}

/// View of the slot a user currently occupies.
///
/// Returned by [`Coordinator::enter`] and [`Coordinator::switch_to`]. The
/// occupancy itself lives in the coordinator; the handle is a cheap view
/// whose main job is [`begin_use`](SlotHandle::begin_use).
#[derive(Clone, Copy)]
pub struct SlotHandle<'a> {
    coordinator: &'a Coordinator,
    index: usize,
}

impl SlotHandle<'_> {
    /// Name of the occupied slot.
    pub fn name(&self) -> &str {
        self.coordinator.slots[self.index].name()
    }

    /// The underlying resource.
    pub fn resource(&self) -> &ResourceRef {
        &self.coordinator.slots[self.index].resource
    }

    /// Runs this occupancy turn's external action.
    ///
    /// Call exactly once per `enter`/`switch_to`, before the next
    /// operation. In order, this: releases the predecessor slot's handoff
    /// gate (the move is now complete from its perspective), settles the
    /// admission deadlines this occupancy was holding, waits for the prior
    /// occupant of this slot to finish its action, invokes
    /// [`Resource::perform`](crate::Resource::perform), and finally
    /// registers a fresh tenure deadline for the turn that just ran.
    ///
    /// Actions of consecutive occupants of one slot never overlap, even
    /// though occupancy bookkeeping may already have changed hands.
    pub fn begin_use(&self) {
        self.coordinator.begin_use(self.index);
    }
}

impl Coordinator {
    pub(crate) fn from_parts(resources: Vec<ResourceRef>, subscribers: SubscriberSet) -> Self {
        let slots: Vec<Slot> = resources.into_iter().map(Slot::new).collect();
        let by_name = slots
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name().to_owned(), i))
            .collect();
        let admission = Admission::new(slots.len());

        Self {
            slots,
            by_name,
            occupied: DashMap::new(),
            admission,
            detection: Mutex::new(()),
            subscribers,
        }
    }

    /// Number of slots in the table.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Occupies the named slot, entering from outside.
    ///
    /// Blocks on the admission window if entering now would overtake a
    /// hold that is already due, then on the slot itself if occupied
    /// (FIFO behind earlier requests). Naming an unknown resource is a
    /// precondition violation and panics with
    /// [`Fault::UnknownResource`].
    pub fn enter(&self, name: &str) -> SlotHandle<'_> {
        let target = self.index_of(name);
        let user = thread::current().id();
        let label = user_label();

        let reservation = self.admission.reserve();
        if let Some(signal) = reservation.parked {
            self.emit(
                Event::new(EventKind::EnterDeferred)
                    .with_user(Arc::clone(&label))
                    .with_slot(self.slots[target].name())
                    .with_arrival(reservation.arrival),
            );
            signal.wait();
        }

        let slot = &self.slots[target];
        let mut state = slot.state.lock();
        if state.occupant.is_some() {
            let signal = state.enqueue(user, None, Some(reservation.deadline));
            drop(state);

            self.emit(
                Event::new(EventKind::EnterQueued)
                    .with_user(Arc::clone(&label))
                    .with_slot(slot.name()),
            );

            // The granting thread completes the whole transfer before
            // waking us; nothing is left to do here.
            let grant = signal.wait();
            debug_assert_eq!(grant, Grant::Queue, "entrants are never part of a cycle");
        } else {
            state.install(user);
            {
                let mut turn = slot.turn.lock();
                turn.prev = None;
                turn.entry_deadline = Some(reservation.deadline);
            }
            drop(state);
            self.occupied.insert(user, target);
        }

        self.emit(
            Event::new(EventKind::Entered)
                .with_user(label)
                .with_slot(slot.name()),
        );
        SlotHandle {
            coordinator: self,
            index: target,
        }
    }

    /// Moves the calling user to the named slot.
    ///
    /// Immediate for the slot it already occupies (refresh) and for a free
    /// target. A busy target means parking FIFO on its queue — unless the
    /// pending moves form a closed chain back to the caller's slot, in
    /// which case the whole cycle is rotated one step atomically and
    /// everyone proceeds. Calling without occupying a slot panics with
    /// [`Fault::NotOccupying`].
    pub fn switch_to(&self, name: &str) -> SlotHandle<'_> {
        let target = self.index_of(name);
        let user = thread::current().id();
        let label = user_label();
        let old = match self.occupied.get(&user) {
            Some(entry) => *entry,
            None => panic!("{}", Fault::NotOccupying),
        };

        if target == old {
            // Refresh: a new turn on the same slot, no handoff involved.
            let slot = &self.slots[target];
            let mut state = slot.state.lock();
            state.install(user);
            slot.turn.lock().prev = None;
            drop(state);

            self.emit(
                Event::new(EventKind::Switched)
                    .with_user(label)
                    .with_slot(slot.name())
                    .with_from(slot.name()),
            );
            return SlotHandle {
                coordinator: self,
                index: target,
            };
        }

        let slot = &self.slots[target];
        let mut state = slot.state.lock();
        if state.occupant.is_some() {
            drop(state);
            let section = self.detection.lock();
            state = slot.state.lock();
            if state.occupant.is_some() {
                return self.switch_contended(section, state, user, label, old, target);
            }
            // Vacated while we queued for the section; no walk needed.
            drop(section);
        }

        // Free target: take it, then hand the old slot onward.
        state.install(user);
        slot.turn.lock().prev = Some(old);
        drop(state);
        self.occupied.insert(user, target);

        self.vacate(old);
        self.emit(
            Event::new(EventKind::Switched)
                .with_user(label)
                .with_slot(slot.name())
                .with_from(self.slots[old].name()),
        );
        SlotHandle {
            coordinator: self,
            index: target,
        }
    }

    /// Departs entirely, vacating the occupied slot.
    ///
    /// Settles any admission deadlines still attached to the final turn,
    /// grants the slot to its first queued waiter (or marks it Free), and
    /// releases the handoff gate taken while vacating — a departing user
    /// has no further action that would do it. Calling without occupying
    /// a slot panics with [`Fault::NotOccupying`].
    pub fn leave(&self) {
        let user = thread::current().id();
        let label = user_label();
        let (_, index) = match self.occupied.remove(&user) {
            Some(entry) => entry,
            None => panic!("{}", Fault::NotOccupying),
        };
        let slot = &self.slots[index];

        let (tenure, entry) = {
            let mut turn = slot.turn.lock();
            (turn.tenure_deadline.take(), turn.entry_deadline.take())
        };
        if let Some(deadline) = tenure {
            self.admission.release(deadline);
        }
        if let Some(deadline) = entry {
            self.admission.release(deadline);
        }

        // Departed as far as observers are concerned; the grant below can
        // only be seen after this event.
        self.emit(
            Event::new(EventKind::Left)
                .with_user(label)
                .with_slot(slot.name()),
        );

        self.vacate(index);
        slot.handoff.release();
    }

    /// Contended switch: the target was occupied when we took the
    /// detection section. Walks the outgoing-link chain and either rotates
    /// a detected cycle or parks the caller.
    fn switch_contended<'a>(
        &'a self,
        section: MutexGuard<'a, ()>,
        first: MutexGuard<'a, SlotState>,
        user: UserId,
        label: Arc<str>,
        old: usize,
        target: usize,
    ) -> SlotHandle<'a> {
        // Lock the chain in link order. The walk can only end at a slot
        // with no outgoing link or at `old`: links are recorded by parked
        // movers, `old`'s occupant is this thread (not parked, so `old`
        // cannot appear mid-chain), and any older cycle would have been
        // resolved inside the section that closed it.
        let mut chain: Vec<(usize, MutexGuard<'a, SlotState>)> = Vec::new();
        let mut cursor = first.next;
        chain.push((target, first));
        while let Some(index) = cursor {
            let guard = self.slots[index].state.lock();
            cursor = guard.next;
            chain.push((index, guard));
        }

        let closes_cycle = chain.last().map(|(index, _)| *index) == Some(old);
        if closes_cycle {
            self.rotate(section, chain, user, Arc::clone(&label), old, target)
        } else {
            // No cycle: record where this slot's occupant wants to go,
            // park FIFO on the target, and release everything before
            // sleeping.
            let signal = {
                let mut old_state = self.slots[old].state.lock();
                old_state.next = Some(target);
                let (_, target_state) = &mut chain[0];
                target_state.enqueue(user, Some(old), None)
            };
            drop(chain);
            drop(section);

            self.emit(
                Event::new(EventKind::SwitchQueued)
                    .with_user(Arc::clone(&label))
                    .with_slot(self.slots[target].name())
                    .with_from(self.slots[old].name()),
            );

            match signal.wait() {
                // The rotation that woke us already re-homed the old
                // slot; touching it now would vacate someone else.
                Grant::Rotation => {}
                Grant::Queue => self.vacate(old),
            }

            self.emit(
                Event::new(EventKind::Switched)
                    .with_user(label)
                    .with_slot(self.slots[target].name())
                    .with_from(self.slots[old].name()),
            );
            SlotHandle {
                coordinator: self,
                index: target,
            }
        }
    }

    /// Resolves a detected cycle as one atomic rotation.
    ///
    /// `chain` runs `[target, ..., old]` in link order, every slot locked.
    /// Each slot's occupancy moves one step along the chain; the caller
    /// takes `target`; the mover parked on each slot with origin equal to
    /// its chain predecessor is installed there. The caller's old slot is
    /// re-homed by the last pair — no separate vacate, and no slot in the
    /// chain ever becomes Free.
    fn rotate<'a>(
        &'a self,
        section: MutexGuard<'a, ()>,
        mut chain: Vec<(usize, MutexGuard<'a, SlotState>)>,
        user: UserId,
        label: Arc<str>,
        old: usize,
        target: usize,
    ) -> SlotHandle<'a> {
        log::trace!(
            "rotating a cycle of {} slots starting at {:?}",
            chain.len(),
            self.slots[target].name()
        );

        // Take every handoff gate up front, standing in for each mover's
        // departing side; their first actions on the new slots release
        // them pairwise.
        for (index, _) in &chain {
            self.slots[*index].handoff.acquire();
        }

        let mut wakes: Vec<(Arc<OneShot<Grant>>, UserId, usize)> = Vec::new();
        let mut predecessor: Option<usize> = None;
        for (index, state) in chain.iter_mut() {
            match predecessor {
                None => {
                    // Head of the chain: the caller takes its target.
                    state.install(user);
                    self.slots[*index].turn.lock().prev = Some(old);
                }
                Some(origin) => {
                    let waiter = match state.take_waiter_from(origin) {
                        Some(w) => w,
                        None => panic!("{}", Fault::MissingCycleWaiter { origin }),
                    };
                    state.install(waiter.user);
                    self.slots[*index].turn.lock().prev = Some(origin);
                    wakes.push((waiter.signal, waiter.user, *index));
                }
            }
            predecessor = Some(*index);
        }

        let cycle_len = chain.len();
        drop(chain);

        // Occupancy map before the wakes: a woken mover may immediately
        // issue its next operation and must see itself re-homed.
        self.occupied.insert(user, target);
        for (_, mover, index) in &wakes {
            self.occupied.insert(*mover, *index);
        }
        for (signal, _, _) in wakes {
            signal.send(Grant::Rotation);
        }
        drop(section);

        self.emit(
            Event::new(EventKind::CycleRotated)
                .with_user(Arc::clone(&label))
                .with_slot(self.slots[target].name())
                .with_cycle_len(cycle_len),
        );
        self.emit(
            Event::new(EventKind::Switched)
                .with_user(label)
                .with_slot(self.slots[target].name())
                .with_from(self.slots[old].name()),
        );
        SlotHandle {
            coordinator: self,
            index: target,
        }
    }

    /// Hands a slot to its first queued waiter, or marks it Free.
    ///
    /// Acquires the slot's handoff gate before anything can be granted:
    /// the departing occupant is still "present" until its next action
    /// begins, and the gate is what the successor's action waits on. For
    /// a switching departer the gate is released by its `begin_use` on the
    /// new slot; a leaver releases it right after this call.
    fn vacate(&self, index: usize) {
        let slot = &self.slots[index];
        let mut state = slot.state.lock();
        state.clear();
        let waiter = state.pop_waiter();
        slot.handoff.acquire();

        match waiter {
            Some(waiter) => {
                state.install(waiter.user);
                {
                    let mut turn = slot.turn.lock();
                    turn.prev = waiter.from;
                    if let Some(deadline) = waiter.entry_deadline {
                        turn.entry_deadline = Some(deadline);
                    }
                }
                drop(state);
                self.occupied.insert(waiter.user, index);
                waiter.signal.send(Grant::Queue);
            }
            None => {
                log::trace!("slot {:?} is now free", slot.name());
                drop(state);
            }
        }
    }

    /// The external-action protocol behind [`SlotHandle::begin_use`].
    fn begin_use(&self, index: usize) {
        let slot = &self.slots[index];
        let label = user_label();

        let (prev, tenure, entry) = {
            let mut turn = slot.turn.lock();
            (
                turn.prev.take(),
                turn.tenure_deadline.take(),
                turn.entry_deadline.take(),
            )
        };

        // The move that brought us here is complete: whoever now relies on
        // the old slot's handoff may proceed.
        if let Some(previous) = prev {
            self.slots[previous].handoff.release();
        }
        if let Some(deadline) = tenure {
            self.admission.release(deadline);
        }
        if let Some(deadline) = entry {
            self.admission.release(deadline);
        }

        slot.handoff.acquire();
        self.emit(
            Event::new(EventKind::UseStarted)
                .with_user(Arc::clone(&label))
                .with_slot(slot.name()),
        );
        slot.resource.perform();
        slot.handoff.release();
        self.emit(
            Event::new(EventKind::UseFinished)
                .with_user(label)
                .with_slot(slot.name()),
        );

        // Worst-case bound for the turn that just ran; settled by the next
        // occupant of this slot, or by our own leave.
        let fresh = self.admission.clock() + self.admission.window();
        slot.turn.lock().tenure_deadline = Some(fresh);
        self.admission.register(fresh);
    }

    fn index_of(&self, name: &str) -> usize {
        match self.by_name.get(name) {
            Some(&index) => index,
            None => panic!(
                "{}",
                Fault::UnknownResource {
                    name: name.to_owned()
                }
            ),
        }
    }

    fn emit(&self, event: Event) {
        self.subscribers.emit(&event);
    }
}

fn user_label() -> Arc<str> {
    let current = thread::current();
    match current.name() {
        Some(name) => Arc::from(name),
        None => Arc::from(format!("{:?}", current.id()).as_str()),
    }
}
