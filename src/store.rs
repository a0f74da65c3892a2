//! Arena that owns every indexed entry.

use crate::error::{IndexError, Result};
use crate::interval::Entry;
use std::ops::Index;

/// Position of an entry in the [`EntryStore`], assigned in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryIndex(pub(crate) u32);

impl EntryIndex {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Append-only entry arena. Trees and vines refer to entries by index.
#[derive(Debug, Clone, Default)]
pub struct EntryStore {
    entries: Vec<Entry>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append an entry and return its index.
    pub fn push(&mut self, entry: Entry) -> Result<EntryIndex> {
        let idx = u32::try_from(self.entries.len())
            .ok()
            .filter(|&i| i < u32::MAX)
            .ok_or(IndexError::TooManyEntries)?;
        self.entries.push(entry);
        Ok(EntryIndex(idx))
    }

    #[inline]
    pub fn get(&self, index: EntryIndex) -> Option<&Entry> {
        self.entries.get(index.as_usize())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Index<EntryIndex> for EntryStore {
    type Output = Entry;

    #[inline]
    fn index(&self, index: EntryIndex) -> &Entry {
        &self.entries[index.as_usize()]
    }
}
