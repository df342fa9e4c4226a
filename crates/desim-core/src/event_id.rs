//! Lightweight, copyable, non-owning handle to a scheduled event.

use crate::event::EventKey;

/// A handle to a scheduled event. Cheap to copy, non-owning.
///
/// The original kernel carried a raw pointer to the event alongside `ns`
/// and `uid`, and validity was still judged by comparing `ns`/`uid` against
/// engine progress rather than by the pointer being live. This rewrite
/// drops the pointer entirely — `EventId` is a pure value, and every
/// operation that needs the underlying event (`cancel`, `remove`) looks it
/// up in the scheduler by key instead of dereferencing a possibly-stale
/// pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventId {
    valid: bool,
    pub(crate) key: EventKey,
}

impl EventId {
    pub(crate) fn new(key: EventKey) -> Self {
        Self { valid: true, key }
    }

    /// A default-constructed, "null" id — never refers to a real event.
    pub fn null() -> Self {
        Self::default()
    }

    /// True for a default-constructed id.
    pub fn is_null(self) -> bool {
        !self.valid
    }

    /// The scheduled-ns component of this id's key.
    pub fn ns(self) -> u64 {
        self.key.ns
    }

    /// The uid component of this id's key.
    pub fn uid(self) -> u32 {
        self.key.uid
    }
}
