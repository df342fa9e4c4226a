//! Binary-heap scheduler backend: `O(log n)` insert/remove-next, and
//! `O(log n)` remove-by-id via an index stashed in each event.
//!
//! `std::collections::BinaryHeap` doesn't expose the positions it swaps
//! elements through, so this is a hand-rolled array heap: every swap
//! updates both the moved elements' `heap_index` and the `by_uid` lookup
//! table, which is what lets `remove(id)` jump straight to the element
//! instead of scanning.

use std::collections::HashMap;

use super::Scheduler;
use crate::error::KernelError;
use crate::event::{EventImpl, EventKey};
use crate::event_id::EventId;

struct Entry {
    key: EventKey,
    event: EventImpl,
}

#[derive(Default)]
pub struct SchedulerHeap {
    entries: Vec<Entry>,
    by_uid: HashMap<u32, usize>,
}

impl SchedulerHeap {
    pub fn new() -> Self {
        Self::default()
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.entries[a].event.heap_index = a;
        self.entries[b].event.heap_index = b;
        self.by_uid.insert(self.entries[a].key.uid, a);
        self.by_uid.insert(self.entries[b].key.uid, b);
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.entries[idx].key < self.entries[parent].key {
                self.swap(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * idx + 1;
            let right = 2 * idx + 2;
            let mut smallest = idx;
            if left < len && self.entries[left].key < self.entries[smallest].key {
                smallest = left;
            }
            if right < len && self.entries[right].key < self.entries[smallest].key {
                smallest = right;
            }
            if smallest == idx {
                break;
            }
            self.swap(idx, smallest);
            idx = smallest;
        }
    }

    fn remove_at(&mut self, idx: usize) -> Entry {
        let last = self.entries.len() - 1;
        self.swap(idx, last);
        let removed = self.entries.pop().expect("non-empty heap");
        self.by_uid.remove(&removed.key.uid);
        if idx < self.entries.len() {
            // The element swapped into `idx` may need to move either way.
            self.sift_down(idx);
            self.sift_up(idx);
        }
        removed
    }
}

impl Scheduler for SchedulerHeap {
    fn insert(&mut self, mut event: EventImpl, key: EventKey) -> EventId {
        let idx = self.entries.len();
        event.heap_index = idx;
        self.entries.push(Entry { key, event });
        self.by_uid.insert(key.uid, idx);
        self.sift_up(idx);
        EventId::new(key)
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn peek_next_key(&self) -> EventKey {
        self.entries
            .first()
            .expect("peek_next_key on empty scheduler")
            .key
    }

    fn peek_next(&self) -> &EventImpl {
        &self
            .entries
            .first()
            .expect("peek_next on empty scheduler")
            .event
    }

    fn remove_next(&mut self) -> EventImpl {
        assert!(!self.entries.is_empty(), "remove_next on empty scheduler");
        self.remove_at(0).event
    }

    fn remove(&mut self, id: EventId) -> Result<(EventImpl, EventKey), KernelError> {
        match self.by_uid.get(&id.key.uid).copied() {
            Some(idx) if self.entries[idx].key.ns == id.key.ns => {
                let entry = self.remove_at(idx);
                Ok((entry.event, entry.key))
            }
            _ => Err(KernelError::NotFound {
                uid: id.key.uid,
                ns: id.key.ns,
            }),
        }
    }

    fn cancel(&mut self, id: EventId) -> bool {
        match self.by_uid.get(&id.key.uid).copied() {
            Some(idx) if self.entries[idx].key.ns == id.key.ns => {
                self.entries[idx].event.cancel();
                true
            }
            _ => false,
        }
    }

    fn is_valid(&self, id: EventId) -> bool {
        self.by_uid
            .get(&id.key.uid)
            .is_some_and(|&idx| self.entries[idx].key.ns == id.key.ns)
    }
}
