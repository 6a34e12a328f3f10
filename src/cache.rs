//! Identity cache - last known instance per primary key
//!
//! Each repository owns one cache. Entries are written when an instance is
//! saved or materialized from a row and removed when it is deleted; nothing
//! else evicts them. A materialization always replaces the entry for its id,
//! so two reads of the same row yield two independent values and the cache
//! holds the most recent one.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct IdentityCache<T> {
    entries: HashMap<i64, T>,
}

impl<T> Default for IdentityCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IdentityCache<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Store `value` under `id`, returning whatever was there before.
    pub fn insert(&mut self, id: i64, value: T) -> Option<T> {
        self.entries.insert(id, value)
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn remove(&mut self, id: i64) -> Option<T> {
        self.entries.remove(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached ids in ascending order
    pub fn ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
