//! Property-based verification that `desim-core`'s scheduler backends
//! dispatch identically, and that its logs and time arithmetic round-trip.
//!
//! This crate has no production API of its own — it is a test harness,
//! kept as a separate workspace member so its `proptest`/`tempfile`
//! dependencies never leak into `desim-core`'s own dependency tree.

use std::cell::RefCell;
use std::rc::Rc;

use desim_core::{SchedulerBackend, SimulatorEngine, Time};

/// One scripted operation against a `SimulatorEngine`, replayed identically
/// against every backend under test.
#[derive(Debug, Clone, Copy)]
pub enum Op {
    /// Schedule a no-op-tagging closure this many nanoseconds out.
    Schedule(u64),
    /// Cancel the event scheduled by the `n`th `Schedule` op so far, if any.
    Cancel(usize),
    /// Remove the event scheduled by the `n`th `Schedule` op so far, if any.
    Remove(usize),
}

/// Replays `ops` against a fresh engine built on `backend`, returning the
/// order in which scheduled closures actually ran, tagged by the index of
/// their originating `Schedule` op.
pub fn run_ops(ops: &[Op], backend: SchedulerBackend) -> Vec<u32> {
    let engine = SimulatorEngine::with_scheduler(backend);
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut ids = Vec::new();

    for op in ops {
        match *op {
            Op::Schedule(delay_ns) => {
                let order = order.clone();
                let tag = ids.len() as u32;
                let id = engine.schedule(Time::nano_seconds(delay_ns as i64), move || {
                    order.borrow_mut().push(tag);
                });
                ids.push(id);
            }
            Op::Cancel(idx) => {
                if let Some(&id) = ids.get(idx) {
                    engine.cancel(id);
                }
            }
            Op::Remove(idx) => {
                if let Some(&id) = ids.get(idx) {
                    let _ = engine.remove(id);
                }
            }
        }
    }

    engine.run();
    Rc::try_unwrap(order)
        .expect("no dangling closures after run")
        .into_inner()
}
