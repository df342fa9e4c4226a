//! Linked-list scheduler backend: `O(n)` ordered insert, `O(1)` pop and
//! (amortized) `O(1)` remove-by-id. Intended for tiny queues.

use std::collections::HashMap;

use super::Scheduler;
use crate::error::KernelError;
use crate::event::{EventImpl, EventKey};
use crate::event_id::EventId;

struct Node {
    event: EventImpl,
    key: EventKey,
    prev: Option<usize>,
    next: Option<usize>,
}

/// A doubly-linked list of events kept in ascending `(ns, uid)` order,
/// stored in a slab so that node slots never move — which is what makes
/// `remove(id)` an `O(1)` unlink once the slot is found via `by_uid`.
#[derive(Default)]
pub struct SchedulerList {
    arena: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    by_uid: HashMap<u32, usize>,
}

impl SchedulerList {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, node: Node) -> usize {
        if let Some(slot) = self.free.pop() {
            self.arena[slot] = Some(node);
            slot
        } else {
            self.arena.push(Some(node));
            self.arena.len() - 1
        }
    }

    fn unlink(&mut self, slot: usize) -> Node {
        let node = self.arena[slot].take().expect("unlink of freed slot");
        if let Some(prev) = node.prev {
            self.arena[prev].as_mut().unwrap().next = node.next;
        } else {
            self.head = node.next;
        }
        if let Some(next) = node.next {
            self.arena[next].as_mut().unwrap().prev = node.prev;
        }
        self.free.push(slot);
        node
    }
}

impl Scheduler for SchedulerList {
    fn insert(&mut self, event: EventImpl, key: EventKey) -> EventId {
        // Find the first node whose key is >= the new key; splice before it.
        let mut cursor = self.head;
        let mut prev = None;
        while let Some(idx) = cursor {
            let node = self.arena[idx].as_ref().unwrap();
            if node.key > key {
                break;
            }
            prev = cursor;
            cursor = node.next;
        }
        let next = cursor;
        let slot = self.alloc(Node {
            event,
            key,
            prev,
            next,
        });
        match prev {
            Some(p) => self.arena[p].as_mut().unwrap().next = Some(slot),
            None => self.head = Some(slot),
        }
        if let Some(n) = next {
            self.arena[n].as_mut().unwrap().prev = Some(slot);
        }
        self.by_uid.insert(key.uid, slot);
        EventId::new(key)
    }

    fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn peek_next_key(&self) -> EventKey {
        let idx = self.head.expect("peek_next_key on empty scheduler");
        self.arena[idx].as_ref().unwrap().key
    }

    fn peek_next(&self) -> &EventImpl {
        let idx = self.head.expect("peek_next on empty scheduler");
        &self.arena[idx].as_ref().unwrap().event
    }

    fn remove_next(&mut self) -> EventImpl {
        let idx = self.head.expect("remove_next on empty scheduler");
        let key = self.arena[idx].as_ref().unwrap().key;
        self.by_uid.remove(&key.uid);
        self.unlink(idx).event
    }

    fn remove(&mut self, id: EventId) -> Result<(EventImpl, EventKey), KernelError> {
        match self.by_uid.get(&id.key.uid).copied() {
            Some(idx) if self.arena[idx].as_ref().unwrap().key.ns == id.key.ns => {
                self.by_uid.remove(&id.key.uid);
                let node = self.unlink(idx);
                Ok((node.event, node.key))
            }
            _ => Err(KernelError::NotFound {
                uid: id.key.uid,
                ns: id.key.ns,
            }),
        }
    }

    fn cancel(&mut self, id: EventId) -> bool {
        match self.by_uid.get(&id.key.uid).copied() {
            Some(idx) if self.arena[idx].as_ref().unwrap().key.ns == id.key.ns => {
                self.arena[idx].as_mut().unwrap().event.cancel();
                true
            }
            _ => false,
        }
    }

    fn is_valid(&self, id: EventId) -> bool {
        self.by_uid
            .get(&id.key.uid)
            .is_some_and(|&idx| self.arena[idx].as_ref().unwrap().key.ns == id.key.ns)
    }
}
