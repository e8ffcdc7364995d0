//! Optimistic cache
//!
//! Holds records that were speculatively removed from a visible list while
//! their deletion is confirmed. One entry per key; a second `put` for the
//! same key is refused so that concurrent removals cannot overwrite the
//! record a rollback would restore.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::hash::Hash;

/// Concurrent keyed store of speculatively removed records
#[derive(Debug)]
pub struct OptimisticCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, V>,
}

impl<K, V> OptimisticCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Stash `value` under `key`
    ///
    /// Returns the value back if the key is already held.
    ///
    /// # Errors
    /// Returns `Err(value)` when an entry for `key` exists.
    pub fn put(&self, key: K, value: V) -> Result<(), V> {
        match self.entries.entry(key) {
            Entry::Occupied(_) => Err(value),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    /// Drop the entry for `key`; true if one was held
    pub fn remove(&self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Take the entry for `key` back out
    pub fn restore(&self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(_, v)| v)
    }

    /// Whether `key` is held
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of held entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is held
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of held keys, unordered
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}

impl<K, V> Default for OptimisticCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
