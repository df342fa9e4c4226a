//! Amortized cleanup of long-lived event ids.
//!
//! A component that schedules many short-lived events but only occasionally
//! checks on them (a retransmission timer, a periodic probe) would otherwise
//! accumulate one `EventId` per schedule call forever. `EventCollector` caps
//! that growth: it periodically sweeps out ids that have already expired,
//! with a sweep threshold that grows with the collector's size so the sweep
//! cost stays amortized `O(1)` per `track` call.

const CLEANUP_CHUNK_MIN_SIZE: usize = 8;
const CLEANUP_CHUNK_MAX_SIZE: usize = 1024;

use crate::engine::SimulatorEngine;
use crate::event_id::EventId;

/// Tracks a growing set of `EventId`s, periodically dropping the ones whose
/// events have already run or been cancelled.
///
/// Remembers the engine it was last `track`ed against (a cheap clone, since
/// [`SimulatorEngine`] is `Rc`-backed) so that dropping the collector can
/// cancel whatever ids it still holds, mirroring the teacher's RAII
/// destructor.
pub struct EventCollector {
    events: Vec<EventId>,
    next_cleanup: usize,
    engine: Option<SimulatorEngine>,
}

impl Default for EventCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_cleanup: CLEANUP_CHUNK_MIN_SIZE,
            engine: None,
        }
    }

    /// Number of ids currently retained (post-sweep, this is an upper bound
    /// on the number of still-pending events).
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Starts tracking `id`. Triggers a sweep once the retained count
    /// reaches the current cleanup threshold.
    pub fn track(&mut self, id: EventId, engine: &SimulatorEngine) {
        self.engine = Some(engine.clone());
        self.events.push(id);
        if self.events.len() >= self.next_cleanup {
            self.cleanup(engine);
        }
    }

    /// Drops every retained id whose event has already expired, then
    /// recomputes the next cleanup threshold from the post-sweep size.
    pub fn cleanup(&mut self, engine: &SimulatorEngine) {
        self.events.retain(|&id| !engine.is_expired(id));
        self.next_cleanup = (2 * self.events.len())
            .max(CLEANUP_CHUNK_MIN_SIZE)
            .min(CLEANUP_CHUNK_MAX_SIZE);
    }

    /// Cancels every retained id and empties the collector.
    pub fn remove_all(&mut self, engine: &SimulatorEngine) {
        for id in self.events.drain(..) {
            engine.cancel(id);
        }
        self.next_cleanup = CLEANUP_CHUNK_MIN_SIZE;
        self.engine = None;
    }
}

impl Drop for EventCollector {
    /// Cancels every id still retained, against the engine it was last
    /// tracked with. A collector that was never `track`ed, or whose ids
    /// were already cleared via `remove_all`, drops with nothing to do.
    fn drop(&mut self) {
        if let Some(engine) = self.engine.take() {
            for id in self.events.drain(..) {
                engine.cancel(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Time;

    #[test]
    fn cleanup_drops_expired_ids_and_keeps_pending_ones() {
        let engine = SimulatorEngine::new();
        let mut collector = EventCollector::new();
        let pending = engine.schedule(Time::seconds(10.0), || {});
        collector.track(pending, &engine);
        for _ in 0..8 {
            let id = engine.schedule_now(|| {});
            collector.track(id, &engine);
        }
        engine.stop_at(Time::seconds(1.0));
        engine.run();
        collector.cleanup(&engine);
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn next_cleanup_threshold_grows_and_is_capped() {
        let engine = SimulatorEngine::new();
        let mut collector = EventCollector::new();
        for _ in 0..2_100 {
            let id = engine.schedule(Time::seconds(100.0), || {});
            collector.track(id, &engine);
        }
        assert!(collector.next_cleanup <= CLEANUP_CHUNK_MAX_SIZE);
    }

    #[test]
    fn remove_all_cancels_every_retained_id() {
        let engine = SimulatorEngine::new();
        let mut collector = EventCollector::new();
        let ran = std::rc::Rc::new(std::cell::Cell::new(false));
        let ran2 = ran.clone();
        let id = engine.schedule(Time::seconds(1.0), move || ran2.set(true));
        collector.track(id, &engine);
        collector.remove_all(&engine);
        assert!(collector.is_empty());
        engine.stop_at(Time::seconds(2.0));
        engine.run();
        assert!(!ran.get());
    }

    #[test]
    fn dropping_collector_cancels_retained_ids() {
        let engine = SimulatorEngine::new();
        let ran = std::rc::Rc::new(std::cell::Cell::new(false));
        let ran2 = ran.clone();
        let id = engine.schedule(Time::seconds(1.0), move || ran2.set(true));
        {
            let mut collector = EventCollector::new();
            collector.track(id, &engine);
        } // collector dropped here, without an explicit remove_all
        engine.stop_at(Time::seconds(2.0));
        engine.run();
        assert!(!ran.get());
    }

    #[test]
    fn dropping_a_never_tracked_collector_is_a_no_op() {
        drop(EventCollector::new());
    }
}
