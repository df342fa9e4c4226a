//! The simulation kernel's main facade: event scheduling, the run loop,
//! and current-time bookkeeping.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use crate::error::KernelError;
use crate::event::{EventImpl, EventKey};
use crate::event_id::EventId;
use crate::log::LogRecord;
use crate::scheduler::{Scheduler, SchedulerBackend};
use crate::time::Time;

/// Where an engine is in its lifecycle. Purely observational — nothing in
/// the engine's behavior branches on it except `run`/`destroy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No event has ever been scheduled.
    Idle,
    /// At least one event is queued, but `run` has not been called yet.
    Ready,
    /// Inside `run`'s dispatch loop.
    Running,
    /// `run` has returned, or `destroy` has been called.
    Stopped,
}

struct EngineInner {
    scheduler: Option<Box<dyn Scheduler>>,
    backend_choice: Option<SchedulerBackend>,
    current_ns: u64,
    current_uid: u32,
    next_uid: u32,
    stop: bool,
    stop_at_ns: u64,
    destroy_list: Vec<EventImpl>,
    log: Option<BufWriter<File>>,
    state: EngineState,
}

impl EngineInner {
    fn new() -> Self {
        Self {
            scheduler: None,
            backend_choice: None,
            current_ns: 0,
            current_uid: 0,
            next_uid: 0,
            stop: false,
            stop_at_ns: 0,
            destroy_list: Vec::new(),
            log: None,
            state: EngineState::Idle,
        }
    }

    fn ensure_scheduler(&mut self) -> &mut Box<dyn Scheduler> {
        if self.scheduler.is_none() {
            let backend = self.backend_choice.take().unwrap_or(SchedulerBackend::List);
            self.scheduler = Some(backend.build());
            if self.state == EngineState::Idle {
                self.state = EngineState::Ready;
            }
        }
        self.scheduler.as_mut().unwrap()
    }

    fn write_log(&mut self, record: LogRecord) {
        if let Some(log) = self.log.as_mut() {
            let _ = writeln!(log, "{record}");
        }
    }
}

/// A single discrete-event simulation. `Clone` is cheap — every clone shares
/// the same underlying state through an `Rc`, which is exactly what lets a
/// dispatched closure re-enter the engine that is running it: clone the
/// handle into the closure, and call `schedule`/`cancel`/`remove`/`stop` from
/// inside. `dispatch_next` never holds this engine's internal borrow across
/// a closure invocation, so that re-entrant call borrows and releases
/// cleanly rather than panicking on an already-borrowed `RefCell`.
///
/// Not `Send`/`Sync`: exactly one simulation runs per engine, and an engine
/// (or any of its clones) is meant to live on the thread that drives it.
#[derive(Clone)]
pub struct SimulatorEngine {
    inner: Rc<RefCell<EngineInner>>,
}

impl Default for SimulatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatorEngine {
    /// A fresh engine with no scheduler backend selected yet (the default,
    /// [`SchedulerBackend::List`], is built lazily on first use).
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(EngineInner::new())),
        }
    }

    /// A fresh engine that will build `backend` the first time it needs a
    /// scheduler.
    pub fn with_scheduler(backend: SchedulerBackend) -> Self {
        let engine = Self::new();
        engine.inner.borrow_mut().backend_choice = Some(backend);
        engine
    }

    /// Selects which scheduler backend to build. Last call before first use
    /// wins — including an [`SchedulerBackend::External`] factory, which is
    /// never silently overridden by a later non-external selection once it
    /// has actually been built.
    ///
    /// # Errors
    /// Returns [`KernelError::ConfigurationConflict`] if a scheduler has
    /// already been built (by scheduling an event, or by any other call
    /// that touches the scheduler).
    pub fn set_scheduler(&self, backend: SchedulerBackend) -> Result<(), KernelError> {
        let mut inner = self.inner.borrow_mut();
        if inner.scheduler.is_some() {
            return Err(KernelError::ConfigurationConflict(
                "scheduler backend already selected; a scheduler has already been built"
                    .to_string(),
            ));
        }
        inner.backend_choice = Some(backend);
        Ok(())
    }

    /// The current simulated time. Before any event has been dispatched,
    /// this is [`Time::zero`].
    pub fn now(&self) -> Time {
        let inner = self.inner.borrow();
        Time::from_resolution_count(crate::high_precision::HighPrecision::from_int(
            inner.current_ns as i64,
        ))
    }

    /// Schedules `f` to run `delay` after [`Self::now`].
    ///
    /// `f` may itself call back into this same engine — clone the handle
    /// into the closure first — including scheduling further events,
    /// cancelling or removing others, or calling [`Self::stop`]/
    /// [`Self::stop_at`]. A same-instant re-entrant schedule is assigned a
    /// uid strictly greater than the event that scheduled it, so it always
    /// runs after its scheduler even when both share an instant.
    ///
    /// # Panics
    /// Panics if `delay` is negative — scheduling into the past is a
    /// programmer error, not a recoverable condition.
    pub fn schedule(&self, delay: Time, f: impl FnOnce() + 'static) -> EventId {
        assert!(
            delay.is_positive_or_zero(),
            "schedule: delay must be non-negative"
        );
        let now = self.now();
        let absolute = now.add(delay);
        let mut inner = self.inner.borrow_mut();
        let uid = inner.next_uid;
        inner.next_uid = inner.next_uid.wrapping_add(1);
        let key = EventKey {
            ns: absolute.scheduler_units(),
            uid,
        };
        tracing::trace!(new_uid = uid, new_ns = key.ns, "scheduling event");
        inner.write_log(LogRecord::Insert {
            current_uid: inner.current_uid,
            current_ns: inner.current_ns,
            new_uid: uid,
            new_ns: key.ns,
        });
        inner.ensure_scheduler().insert(EventImpl::new(f), key)
    }

    /// Schedules `f` to run with zero delay, i.e. as the next event at (or
    /// after) every event already queued for the current instant.
    pub fn schedule_now(&self, f: impl FnOnce() + 'static) -> EventId {
        self.schedule(Time::zero(), f)
    }

    /// Registers `f` to run once, in registration order, when [`Self::destroy`]
    /// is called. Destroy events are never inserted into the scheduler and
    /// never appear in the event-trace log.
    pub fn schedule_destroy(&self, f: impl FnOnce() + 'static) {
        self.inner.borrow_mut().destroy_list.push(EventImpl::new(f));
    }

    /// Cancels `id`'s event if it is still queued. A no-op if `id` is null,
    /// already expired, or already cancelled.
    pub fn cancel(&self, id: EventId) {
        if id.is_null() {
            return;
        }
        tracing::trace!(uid = id.uid(), ns = id.ns(), "cancelling event");
        self.inner.borrow_mut().ensure_scheduler().cancel(id);
    }

    /// Removes `id`'s event from the scheduler entirely, without invoking it.
    ///
    /// # Errors
    /// Returns [`KernelError::NotFound`] if `id` does not identify an event
    /// currently in the scheduler.
    pub fn remove(&self, id: EventId) -> Result<(), KernelError> {
        let mut inner = self.inner.borrow_mut();
        let (_event, key) = inner.ensure_scheduler().remove(id)?;
        tracing::trace!(uid = key.uid, ns = key.ns, "removed event");
        inner.write_log(LogRecord::Remove {
            current_uid: inner.current_uid,
            current_ns: inner.current_ns,
            removed_uid: key.uid,
            removed_ns: key.ns,
        });
        Ok(())
    }

    /// True if `id` is null, or refers to an event that has already run or
    /// whose instant has already passed.
    pub fn is_expired(&self, id: EventId) -> bool {
        if id.is_null() {
            return true;
        }
        let inner = self.inner.borrow();
        id.ns() < inner.current_ns || (id.ns() == inner.current_ns && id.uid() <= inner.current_uid)
    }

    /// True if the scheduler holds no more events. An engine on which
    /// nothing has ever been scheduled is trivially finished.
    pub fn is_finished(&self) -> bool {
        match self.inner.borrow().scheduler.as_ref() {
            Some(scheduler) => scheduler.is_empty(),
            None => true,
        }
    }

    /// Requests that [`Self::run`] stop before dispatching any further
    /// event, including one already due at the current instant. Safe to
    /// call from inside a dispatched event (clone the handle in first).
    pub fn stop(&self) {
        self.inner.borrow_mut().stop = true;
    }

    /// Sets an absolute stop time: `run` exits before dispatching any event
    /// scheduled strictly after `at`.
    ///
    /// A `stop_at` of [`Time::zero`] is indistinguishable from "no stop time
    /// set" (both store as the `0` sentinel) — a quirk inherited unchanged
    /// from the original kernel, and harmless in practice since no real
    /// simulation both runs and intends to stop at time zero.
    pub fn stop_at(&self, at: Time) {
        self.inner.borrow_mut().stop_at_ns = at.scheduler_units();
    }

    /// Where this engine is in its lifecycle.
    pub fn state(&self) -> EngineState {
        self.inner.borrow().state
    }

    /// Writes every queued event, earliest-first, dispatching each unless it
    /// was cancelled first. Returns when the scheduler is empty, `stop` has
    /// been called, or the next event is later than any `stop_at` time.
    pub fn run(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.stop = false;
            inner.state = EngineState::Running;
        }
        tracing::debug!("simulation run starting");
        loop {
            let is_empty = self.inner.borrow_mut().ensure_scheduler().is_empty();
            if is_empty {
                break;
            }
            let next = self.inner.borrow().scheduler.as_ref().unwrap().peek_next_key();
            let stop_at_ns = self.inner.borrow().stop_at_ns;
            if stop_at_ns != 0 && next.ns > stop_at_ns {
                break;
            }
            self.dispatch_next(next);
            if self.inner.borrow().stop {
                break;
            }
        }
        let mut inner = self.inner.borrow_mut();
        tracing::debug!(
            current_ns = inner.current_ns,
            current_uid = inner.current_uid,
            "simulation run stopped"
        );
        inner.state = EngineState::Stopped;
    }

    /// Pops the earliest event and invokes it. The pop, key bookkeeping, and
    /// log write all happen while `inner` is borrowed; that borrow is
    /// dropped before `invoke` runs, so a closure that re-enters this engine
    /// takes a fresh, uncontended borrow rather than panicking on one held
    /// by its own caller.
    fn dispatch_next(&self, key: EventKey) {
        let mut event = {
            let mut inner = self.inner.borrow_mut();
            inner.current_ns = key.ns;
            inner.current_uid = key.uid;
            tracing::trace!(uid = key.uid, ns = key.ns, "dispatching event");
            inner.write_log(LogRecord::Execute {
                uid: key.uid,
                ns: key.ns,
            });
            inner.ensure_scheduler().remove_next()
        };
        event.invoke();
    }

    /// Runs every registered destroy callback, in registration order, then
    /// resets the engine to a fresh, idle state.
    pub fn destroy(&self) {
        let mut events = {
            let mut inner = self.inner.borrow_mut();
            tracing::debug!(
                destroy_callbacks = inner.destroy_list.len(),
                "tearing down engine"
            );
            std::mem::take(&mut inner.destroy_list)
        };
        for event in events.iter_mut() {
            event.invoke();
        }
        let mut inner = self.inner.borrow_mut();
        inner.scheduler = None;
        inner.backend_choice = None;
        inner.current_ns = 0;
        inner.current_uid = 0;
        inner.next_uid = 0;
        inner.stop = false;
        inner.stop_at_ns = 0;
        inner.log = None;
        inner.state = EngineState::Idle;
    }

    /// Opens `path` for writing and begins appending one line per
    /// scheduler event (insert/execute/remove) to it.
    ///
    /// # Errors
    /// Propagates any I/O error from creating the file.
    pub fn enable_log_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        self.inner.borrow_mut().log = Some(BufWriter::new(File::create(path)?));
        Ok(())
    }
}

thread_local! {
    static DEFAULT_ENGINE: SimulatorEngine = SimulatorEngine::new();
}

/// Runs `f` against this thread's default engine. A convenience for callers
/// that don't want to thread an explicit `SimulatorEngine` handle through
/// their whole call stack; prefer an explicit engine where practical.
pub fn with_default<R>(f: impl FnOnce(&SimulatorEngine) -> R) -> R {
    DEFAULT_ENGINE.with(f)
}
