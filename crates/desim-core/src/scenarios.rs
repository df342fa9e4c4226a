//! End-to-end dispatch scenarios, exercised purely through the public
//! `SimulatorEngine` facade.
//!
//! `SimulatorEngine` is cheap to `Clone` (it's a handle onto shared,
//! `Rc`-backed state), so a dispatched closure that needs to schedule,
//! cancel, remove, or stop can capture a clone of the engine it's running
//! under — S1's `B` and S4's 2s event both do exactly that.

use std::cell::RefCell;
use std::rc::Rc;

use crate::engine::SimulatorEngine;
use crate::time::{set_resolution, Resolution, Time};

#[test]
fn s1_basic_dispatch() {
    let engine = SimulatorEngine::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    let id_a = engine.schedule(Time::micro_seconds(10), || panic!("A must not run"));
    engine.cancel(id_a);

    let id_c = {
        let order = order.clone();
        engine.schedule(Time::micro_seconds(12), move || order.borrow_mut().push("C"))
    };

    {
        let order = order.clone();
        let engine_in_b = engine.clone();
        engine.schedule(Time::micro_seconds(11), move || {
            order.borrow_mut().push("B");
            engine_in_b.remove(id_c).unwrap();
            let order = order.clone();
            engine_in_b.schedule(Time::micro_seconds(10), move || order.borrow_mut().push("D"));
        });
    }

    engine.run();
    assert_eq!(*order.borrow(), vec!["B", "D"]);
}

#[test]
fn s2_same_instant_tie_break() {
    let engine = SimulatorEngine::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    for label in ["E1", "E2", "E3"] {
        let order = order.clone();
        engine.schedule(Time::nano_seconds(5), move || order.borrow_mut().push(label));
    }
    engine.run();
    assert_eq!(*order.borrow(), vec!["E1", "E2", "E3"]);
}

#[test]
fn s3_stop_at_leaves_later_events_queued() {
    let engine = SimulatorEngine::new();
    let fired = Rc::new(RefCell::new(Vec::new()));
    for secs in [1.0, 2.0, 3.0, 4.0, 5.0] {
        let fired = fired.clone();
        engine.schedule(Time::seconds(secs), move || {
            fired.borrow_mut().push(secs as u64);
        });
    }
    engine.stop_at(Time::seconds(3.0));
    engine.run();
    assert_eq!(*fired.borrow(), vec![1, 2, 3]);
    assert!(!engine.is_finished());
}

#[test]
fn s4_stop_inside_event_leaves_its_successor_queued() {
    let engine = SimulatorEngine::new();
    let fired = Rc::new(RefCell::new(Vec::new()));
    for secs in [1.0, 3.0] {
        let fired = fired.clone();
        engine.schedule(Time::seconds(secs), move || fired.borrow_mut().push(secs as u64));
    }
    {
        let fired = fired.clone();
        let engine_in_event = engine.clone();
        engine.schedule(Time::seconds(2.0), move || {
            fired.borrow_mut().push(2);
            engine_in_event.stop();
        });
    }
    engine.run();
    assert_eq!(*fired.borrow(), vec![1, 2]);
    assert!(!engine.is_finished());
}

#[test]
fn s5_picosecond_resolution_preserves_sub_nanosecond_time() {
    set_resolution(Resolution::Pico).unwrap();
    let engine = SimulatorEngine::new();
    let observed = Rc::new(RefCell::new(false));
    {
        let observed = observed.clone();
        engine.schedule(Time::seconds(0.5e-9), move || *observed.borrow_mut() = true);
    }
    engine.run();
    assert!(*observed.borrow());
    assert_eq!(engine.now().approximate_to_nanoseconds(), 0);
}

#[test]
fn s6_destroy_runs_destructors_before_release_and_drops_pending_events() {
    let engine = SimulatorEngine::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    {
        let order = order.clone();
        engine.schedule_destroy(move || order.borrow_mut().push("D1"));
    }
    {
        let order = order.clone();
        engine.schedule_destroy(move || order.borrow_mut().push("D2"));
    }
    engine.schedule(Time::seconds(10.0), || panic!("E must not run"));

    engine.destroy();

    assert_eq!(*order.borrow(), vec!["D1", "D2"]);
    assert!(engine.is_finished());
}
