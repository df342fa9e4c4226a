//! Balanced-tree scheduler backend: `O(log n)` insert/remove, stable
//! key-based handles (no index bookkeeping needed on structural change).

use std::collections::BTreeMap;

use super::Scheduler;
use crate::error::KernelError;
use crate::event::{EventImpl, EventKey};
use crate::event_id::EventId;

#[derive(Default)]
pub struct SchedulerMap {
    events: BTreeMap<EventKey, EventImpl>,
}

impl SchedulerMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for SchedulerMap {
    fn insert(&mut self, event: EventImpl, key: EventKey) -> EventId {
        self.events.insert(key, event);
        EventId::new(key)
    }

    fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn peek_next_key(&self) -> EventKey {
        *self
            .events
            .keys()
            .next()
            .expect("peek_next_key on empty scheduler")
    }

    fn peek_next(&self) -> &EventImpl {
        self.events
            .values()
            .next()
            .expect("peek_next on empty scheduler")
    }

    fn remove_next(&mut self) -> EventImpl {
        let key = self.peek_next_key();
        self.events.remove(&key).expect("key just peeked")
    }

    fn remove(&mut self, id: EventId) -> Result<(EventImpl, EventKey), KernelError> {
        match self.events.remove(&id.key) {
            Some(event) => Ok((event, id.key)),
            None => Err(KernelError::NotFound {
                uid: id.key.uid,
                ns: id.key.ns,
            }),
        }
    }

    fn cancel(&mut self, id: EventId) -> bool {
        match self.events.get_mut(&id.key) {
            Some(event) => {
                event.cancel();
                true
            }
            None => false,
        }
    }

    fn is_valid(&self, id: EventId) -> bool {
        self.events.contains_key(&id.key)
    }
}
