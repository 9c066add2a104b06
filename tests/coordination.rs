//! Scenario tests driving the coordinator with real worker threads.
//!
//! Threads are named so events can be attributed; a channel-backed
//! recording subscriber collects the event stream, and global sequence
//! numbers (`Event::seq`) restore cross-thread order for the assertions.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use slotvisor::{Coordinator, Event, EventKind, ResourceFn, ResourceRef, Subscribe};

// ---- fixture ----------------------------------------------------------

struct Recorder {
    tx: Sender<Event>,
}

impl Subscribe for Recorder {
    fn on_event(&self, event: &Event) {
        let _ = self.tx.send(event.clone());
    }
}

/// Event stream observed by the test body. Events consumed while waiting
/// are kept, so end-of-test assertions see the full history.
struct EventLog {
    rx: Receiver<Event>,
    seen: RefCell<Vec<Event>>,
}

impl EventLog {
    /// Blocks until an event of `kind` attributed to `user` arrives.
    fn await_event(&self, kind: EventKind, user: &str) -> Event {
        loop {
            let ev = self
                .rx
                .recv_timeout(Duration::from_secs(10))
                .unwrap_or_else(|_| panic!("timed out waiting for {kind:?} by {user}"));
            self.seen.borrow_mut().push(ev.clone());
            if ev.kind == kind && ev.user.as_deref() == Some(user) {
                return ev;
            }
        }
    }

    /// Full history: everything awaited plus everything still buffered.
    /// Call after joining the worker threads.
    fn collect(&self) -> Vec<Event> {
        let mut events = self.seen.borrow_mut().clone();
        events.extend(self.rx.try_iter());
        events
    }
}

fn seq_of(events: &[Event], kind: EventKind, user: &str) -> u64 {
    events
        .iter()
        .find(|e| e.kind == kind && e.user.as_deref() == Some(user))
        .unwrap_or_else(|| panic!("no {kind:?} event for {user}"))
        .seq
}

/// Coordinator over no-op resources plus the recorded event stream.
fn recorded(names: &[&str]) -> (Arc<Coordinator>, EventLog) {
    let _ = env_logger::builder().is_test(true).try_init();

    let (tx, rx) = unbounded();
    let resources: Vec<ResourceRef> = names
        .iter()
        .map(|n| ResourceFn::arc(n.to_string(), || {}) as ResourceRef)
        .collect();
    let coordinator = Coordinator::builder()
        .with_resources(resources)
        .with_subscribers(vec![Arc::new(Recorder { tx })])
        .build()
        .unwrap();
    (
        coordinator,
        EventLog {
            rx,
            seen: RefCell::new(Vec::new()),
        },
    )
}

fn spawn_user(name: &str, f: impl FnOnce() + Send + 'static) -> JoinHandle<()> {
    thread::Builder::new()
        .name(name.to_string())
        .spawn(f)
        .unwrap()
}

/// One-shot rendezvous used to pace a worker from the test body.
fn cue() -> (Sender<()>, Receiver<()>) {
    unbounded()
}

// ---- scenarios --------------------------------------------------------

/// Scenario 1: on a single slot, a second entrant waits and is granted
/// the slot next, in arrival order.
#[test]
fn test_single_slot_two_users_fifo() {
    let (coordinator, log) = recorded(&["w"]);

    let (go_leave, leave_cue) = cue();
    let c = Arc::clone(&coordinator);
    let a = spawn_user("A", move || {
        let h = c.enter("w");
        h.begin_use();
        leave_cue.recv().unwrap();
        c.leave();
    });

    log.await_event(EventKind::Entered, "A");

    let c = Arc::clone(&coordinator);
    let b = spawn_user("B", move || {
        let h = c.enter("w");
        h.begin_use();
        c.leave();
    });

    // B must park on the occupied slot before A departs.
    log.await_event(EventKind::EnterQueued, "B");
    go_leave.send(()).unwrap();

    a.join().unwrap();
    b.join().unwrap();

    let events = log.collect();
    let a_left = seq_of(&events, EventKind::Left, "A");
    let b_entered = seq_of(&events, EventKind::Entered, "B");
    assert!(
        a_left < b_entered,
        "B is granted the slot only after A departs"
    );
}

/// Scenario 2: two users wanting each other's slots form a 2-cycle; the
/// cycle is rotated in place and neither slot ever becomes free.
#[test]
fn test_two_cycle_rotates_in_place() {
    let (coordinator, log) = recorded(&["w1", "w2"]);

    let (go_a, a_cue) = cue();
    let c = Arc::clone(&coordinator);
    let a = spawn_user("A", move || {
        let h = c.enter("w1");
        h.begin_use();
        a_cue.recv().unwrap();
        let h = c.switch_to("w2");
        assert_eq!(h.name(), "w2");
        h.begin_use();
        c.leave();
    });
    log.await_event(EventKind::Entered, "A");

    let (go_b, b_cue) = cue();
    let c = Arc::clone(&coordinator);
    let b = spawn_user("B", move || {
        let h = c.enter("w2");
        h.begin_use();
        b_cue.recv().unwrap();
        let h = c.switch_to("w1");
        assert_eq!(h.name(), "w1");
        h.begin_use();
        c.leave();
    });
    log.await_event(EventKind::Entered, "B");

    // A parks on w2 first, recording half of the cycle; then B's switch
    // detects and rotates it.
    go_a.send(()).unwrap();
    log.await_event(EventKind::SwitchQueued, "A");
    go_b.send(()).unwrap();

    a.join().unwrap();
    b.join().unwrap();

    let events = log.collect();
    let rotated: Vec<&Event> = events
        .iter()
        .filter(|e| e.kind == EventKind::CycleRotated)
        .collect();
    assert_eq!(rotated.len(), 1, "exactly one rotation resolves the cycle");
    assert_eq!(rotated[0].cycle_len, Some(2));

    // No departure happened between the requests and the completed
    // switches: the rotation moved occupants without freeing a slot.
    let queued = seq_of(&events, EventKind::SwitchQueued, "A");
    let a_switched = seq_of(&events, EventKind::Switched, "A");
    let b_switched = seq_of(&events, EventKind::Switched, "B");
    let upper = a_switched.max(b_switched);
    assert!(
        !events
            .iter()
            .any(|e| e.kind == EventKind::Left && e.seq > queued && e.seq < upper),
        "no slot was vacated while the cycle resolved"
    );
}

/// A 3-cycle: every mover advances one step along the chain.
#[test]
fn test_three_cycle_rotates_every_mover() {
    let (coordinator, log) = recorded(&["w1", "w2", "w3"]);

    let mut workers = Vec::new();
    let cues: Vec<(Sender<()>, Receiver<()>)> = (0..3).map(|_| cue()).collect();

    for (i, (name, origin, destination)) in [
        ("A", "w1", "w2"),
        ("B", "w2", "w3"),
        ("C", "w3", "w1"),
    ]
    .into_iter()
    .enumerate()
    {
        let c = Arc::clone(&coordinator);
        let go = cues[i].1.clone();
        workers.push(spawn_user(name, move || {
            let h = c.enter(origin);
            h.begin_use();
            go.recv().unwrap();
            let h = c.switch_to(destination);
            assert_eq!(h.name(), destination);
            h.begin_use();
            c.leave();
        }));
        log.await_event(EventKind::Entered, name);
    }

    // Park A and B in chain order, then let C close the cycle.
    cues[0].0.send(()).unwrap();
    log.await_event(EventKind::SwitchQueued, "A");
    cues[1].0.send(()).unwrap();
    log.await_event(EventKind::SwitchQueued, "B");
    cues[2].0.send(()).unwrap();

    for w in workers {
        w.join().unwrap();
    }

    let events = log.collect();
    let rotated: Vec<&Event> = events
        .iter()
        .filter(|e| e.kind == EventKind::CycleRotated)
        .collect();
    assert_eq!(rotated.len(), 1);
    assert_eq!(rotated[0].cycle_len, Some(3));
    assert_eq!(rotated[0].user.as_deref(), Some("C"));
}

/// Scenario 4: switching to the slot already occupied is an immediate
/// refresh with no queueing and no effect on anyone else.
#[test]
fn test_same_slot_switch_is_immediate() {
    let (coordinator, log) = recorded(&["w", "other"]);

    let c = Arc::clone(&coordinator);
    let bystander = spawn_user("B", move || {
        let h = c.enter("other");
        h.begin_use();
        c.leave();
    });
    bystander.join().unwrap();

    let c = Arc::clone(&coordinator);
    let a = spawn_user("A", move || {
        let h = c.enter("w");
        h.begin_use();
        let h = c.switch_to("w");
        h.begin_use();
        c.leave();
    });
    a.join().unwrap();

    let events = log.collect();
    let refresh = events
        .iter()
        .find(|e| e.kind == EventKind::Switched && e.user.as_deref() == Some("A"))
        .expect("refresh emits a Switched event");
    assert_eq!(refresh.slot.as_deref(), Some("w"));
    assert_eq!(refresh.from.as_deref(), Some("w"));
    assert!(
        !events
            .iter()
            .any(|e| matches!(e.kind, EventKind::SwitchQueued | EventKind::CycleRotated)),
        "a same-slot switch never queues or rotates"
    );
}

/// Scenario 3: with one slot (window = 1), a slow occupant lets exactly
/// one later entrant through; the next is deferred until the occupant's
/// entry reservation clears.
#[test]
fn test_admission_window_bounds_overtaking() {
    let (coordinator, log) = recorded(&["w"]);

    let (go_use, use_cue) = cue();
    let (go_leave, leave_cue) = cue();
    let c = Arc::clone(&coordinator);
    let a = spawn_user("A", move || {
        let h = c.enter("w");
        use_cue.recv().unwrap();
        h.begin_use(); // settles A's entry reservation
        leave_cue.recv().unwrap();
        c.leave();
    });
    log.await_event(EventKind::Entered, "A");

    let c = Arc::clone(&coordinator);
    let b = spawn_user("B", move || {
        let h = c.enter("w");
        h.begin_use();
        c.leave();
    });
    // B fits inside the window: it queues on the slot, not on admission.
    log.await_event(EventKind::EnterQueued, "B");

    let c = Arc::clone(&coordinator);
    let worker_c = spawn_user("C", move || {
        let h = c.enter("w");
        h.begin_use();
        c.leave();
    });
    // C would overtake a hold that is already due: deferred.
    log.await_event(EventKind::EnterDeferred, "C");

    // A's first turn settles its entry reservation; C becomes admissible
    // and falls in line behind B.
    go_use.send(()).unwrap();
    log.await_event(EventKind::EnterQueued, "C");
    go_leave.send(()).unwrap();

    a.join().unwrap();
    b.join().unwrap();
    worker_c.join().unwrap();

    let events = log.collect();
    assert!(
        !events
            .iter()
            .any(|e| e.kind == EventKind::EnterDeferred && e.user.as_deref() == Some("B")),
        "one overtaker fits inside the 2N-1 window"
    );
    let b_entered = seq_of(&events, EventKind::Entered, "B");
    let c_entered = seq_of(&events, EventKind::Entered, "C");
    assert!(b_entered < c_entered, "grants follow queue order");
}

/// Two non-cyclic waiters on one slot are served strictly FIFO.
#[test]
fn test_fifo_within_one_slot() {
    let (coordinator, log) = recorded(&["w", "spare"]);

    let (go_leave, leave_cue) = cue();
    let c = Arc::clone(&coordinator);
    let a = spawn_user("A", move || {
        let h = c.enter("w");
        h.begin_use();
        leave_cue.recv().unwrap();
        c.leave();
    });
    log.await_event(EventKind::Entered, "A");

    let mut waiters = Vec::new();
    for name in ["B", "C"] {
        let c = Arc::clone(&coordinator);
        waiters.push(spawn_user(name, move || {
            let h = c.enter("w");
            h.begin_use();
            c.leave();
        }));
        // Sequence the enqueues so arrival order is deterministic.
        log.await_event(EventKind::EnterQueued, name);
    }

    go_leave.send(()).unwrap();
    a.join().unwrap();
    for w in waiters {
        w.join().unwrap();
    }

    let events = log.collect();
    let b_entered = seq_of(&events, EventKind::Entered, "B");
    let b_left = seq_of(&events, EventKind::Left, "B");
    let c_entered = seq_of(&events, EventKind::Entered, "C");
    assert!(b_entered < c_entered, "B enqueued first, B is granted first");
    assert!(b_left < c_entered, "C is granted only once B departs");
}

/// Cycle resolution pulls exactly the loop-closing request, even past an
/// earlier FIFO waiter, which keeps its place at the head of the queue.
#[test]
fn test_rotation_pulls_loop_closer_past_fifo_head() {
    let (coordinator, log) = recorded(&["w1", "w2"]);

    let (go_a, a_cue) = cue();
    let c = Arc::clone(&coordinator);
    let a = spawn_user("A", move || {
        let h = c.enter("w1");
        h.begin_use();
        a_cue.recv().unwrap();
        let h = c.switch_to("w2");
        assert_eq!(h.name(), "w2");
        h.begin_use();
        c.leave();
    });
    log.await_event(EventKind::Entered, "A");

    let (go_b, b_cue) = cue();
    let c = Arc::clone(&coordinator);
    let b = spawn_user("B", move || {
        let h = c.enter("w2");
        h.begin_use();
        b_cue.recv().unwrap();
        let h = c.switch_to("w1");
        assert_eq!(h.name(), "w1");
        h.begin_use();
        c.leave();
    });
    log.await_event(EventKind::Entered, "B");

    // D queues on w2 first...
    let c = Arc::clone(&coordinator);
    let d = spawn_user("D", move || {
        let h = c.enter("w2");
        assert_eq!(h.name(), "w2");
        h.begin_use();
        c.leave();
    });
    log.await_event(EventKind::EnterQueued, "D");

    // ...then A parks behind it, and B closes the 2-cycle. The rotation
    // must reach past D (an entrant, not part of any cycle) and pull A.
    go_a.send(()).unwrap();
    log.await_event(EventKind::SwitchQueued, "A");
    go_b.send(()).unwrap();

    a.join().unwrap();
    b.join().unwrap();
    d.join().unwrap();

    let events = log.collect();
    let rotated = events
        .iter()
        .find(|e| e.kind == EventKind::CycleRotated)
        .expect("the 2-cycle is rotated");
    assert_eq!(rotated.cycle_len, Some(2));

    let d_entered = seq_of(&events, EventKind::Entered, "D");
    let a_switched = seq_of(&events, EventKind::Switched, "A");
    assert!(
        d_entered > rotated.seq,
        "the entrant is not granted by the rotation"
    );
    assert!(
        d_entered > a_switched,
        "D is granted w2 only once A's stay there ends"
    );
}

/// Mutual exclusion under churn: per-slot occupancy counters observed
/// from inside `perform` never exceed one, and every worker finishes
/// through whatever mixture of FIFO grants and rotations the timing
/// produces.
#[test]
fn test_mutual_exclusion_under_churn() {
    let _ = env_logger::builder().is_test(true).try_init();

    const USERS: usize = 6;
    const ROUNDS: usize = 25;
    let names = ["w1", "w2", "w3"];

    let busy: Arc<Vec<AtomicUsize>> =
        Arc::new((0..names.len()).map(|_| AtomicUsize::new(0)).collect());
    let resources: Vec<ResourceRef> = names
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let busy = Arc::clone(&busy);
            ResourceFn::arc(n.to_string(), move || {
                let overlap = busy[i].fetch_add(1, Ordering::SeqCst);
                assert_eq!(overlap, 0, "slot occupied by two users at once");
                thread::sleep(Duration::from_micros(200));
                busy[i].fetch_sub(1, Ordering::SeqCst);
            }) as ResourceRef
        })
        .collect();

    let coordinator = Coordinator::builder()
        .with_resources(resources)
        .build()
        .unwrap();

    let workers: Vec<_> = (0..USERS)
        .map(|t| {
            let c = Arc::clone(&coordinator);
            spawn_user(&format!("user-{t}"), move || {
                let h = c.enter(names[t % names.len()]);
                h.begin_use();
                for round in 1..=ROUNDS {
                    let h = c.switch_to(names[(t + round) % names.len()]);
                    h.begin_use();
                }
                c.leave();
            })
        })
        .collect();

    for w in workers {
        w.join().unwrap();
    }
}

// ---- precondition violations ------------------------------------------

#[test]
#[should_panic(expected = "unknown resource")]
fn test_unknown_resource_is_a_precondition_violation() {
    let (coordinator, _log) = recorded(&["w"]);
    coordinator.enter("nope");
}

#[test]
#[should_panic(expected = "occupies no slot")]
fn test_switch_without_enter_is_a_precondition_violation() {
    let (coordinator, _log) = recorded(&["w"]);
    coordinator.switch_to("w");
}
