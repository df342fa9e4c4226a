//! Pluggable event scheduler backends.
//!
//! Exactly one backend is active per simulation. All three satisfy the
//! same ordering contract: `remove_next` always returns events in
//! non-decreasing `(ns, uid)` lexicographic order, with no ties (uids are
//! unique process-wide).

mod heap;
mod list;
mod map;

pub use heap::SchedulerHeap;
pub use list::SchedulerList;
pub use map::SchedulerMap;

use crate::error::KernelError;
use crate::event::{EventImpl, EventKey};
use crate::event_id::EventId;

/// A priority queue of `(EventKey, EventImpl)` honoring the `(ns, uid)`
/// lexicographic order.
pub trait Scheduler {
    /// Takes ownership of `event`, stores it under `key`, and returns a
    /// handle to it.
    fn insert(&mut self, event: EventImpl, key: EventKey) -> EventId;

    /// True if no events remain.
    fn is_empty(&self) -> bool;

    /// The key of the earliest event. Precondition: not empty.
    fn peek_next_key(&self) -> EventKey;

    /// A reference to the earliest event. Precondition: not empty.
    fn peek_next(&self) -> &EventImpl;

    /// Extracts and returns the earliest event. Precondition: not empty.
    fn remove_next(&mut self) -> EventImpl;

    /// Extracts a specific event by id.
    ///
    /// # Errors
    /// Returns [`KernelError::NotFound`] if `id` does not identify an event
    /// currently in the queue.
    fn remove(&mut self, id: EventId) -> Result<(EventImpl, EventKey), KernelError>;

    /// Marks the event identified by `id` as cancelled, if it is still
    /// queued. Returns `false` if `id` is not (or no longer) present —
    /// callers treat that as a no-op, matching "cancelling an
    /// already-expired id is safe".
    fn cancel(&mut self, id: EventId) -> bool;

    /// True if `id` identifies an event currently in the queue.
    fn is_valid(&self, id: EventId) -> bool;
}

/// Selects which concrete [`Scheduler`] backend an engine should use.
pub enum SchedulerBackend {
    /// `O(n)` ordered insert, `O(1)` remove — good for tiny queues.
    List,
    /// `O(log n)` insert/remove via an index-tracking binary heap.
    Heap,
    /// `O(log n)` insert/remove via a balanced tree; stable iterator-style
    /// handles.
    Map,
    /// A caller-supplied backend, built lazily by `factory` the first time
    /// the engine needs a scheduler.
    External(Box<dyn FnOnce() -> Box<dyn Scheduler>>),
}

impl SchedulerBackend {
    pub(crate) fn build(self) -> Box<dyn Scheduler> {
        match self {
            SchedulerBackend::List => Box::new(SchedulerList::new()),
            SchedulerBackend::Heap => Box::new(SchedulerHeap::new()),
            SchedulerBackend::Map => Box::new(SchedulerMap::new()),
            SchedulerBackend::External(factory) => factory(),
        }
    }
}
