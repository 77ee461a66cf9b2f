//! Backing Map Module
//!
//! The entry store depends on a narrow map capability rather than a concrete
//! container, so the key→entry mapping is pluggable. Two implementations are
//! provided: a plain `HashMap` (default) and an `IndexMap` for callers that
//! want deterministic iteration in debugging sessions.
//!
//! The engine never iterates the backing map; enumeration always goes through
//! the recency order index. That keeps this trait small.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::cache::CacheEntry;

// == Entry Map Trait ==
/// Capability interface the entry store requires of its backing container.
pub trait EntryMap<V>: Default {
    /// Looks up an entry by key.
    fn get(&self, key: &str) -> Option<&CacheEntry<V>>;

    /// Looks up an entry mutably by key.
    fn get_mut(&mut self, key: &str) -> Option<&mut CacheEntry<V>>;

    /// Inserts an entry, returning the previous one if the key was present.
    fn insert(&mut self, key: String, entry: CacheEntry<V>) -> Option<CacheEntry<V>>;

    /// Removes and returns the entry for a key.
    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>>;

    /// Checks key residency without touching the entry.
    fn contains_key(&self, key: &str) -> bool;

    /// Number of resident entries.
    fn len(&self) -> usize;

    /// Whether the map holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all entries.
    fn clear(&mut self);
}

// == HashMap Backing ==
/// Default backing store over `std::collections::HashMap`.
#[derive(Debug)]
pub struct HashMapBacking<V> {
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V> Default for HashMapBacking<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> EntryMap<V> for HashMapBacking<V> {
    fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut CacheEntry<V>> {
        self.entries.get_mut(key)
    }

    fn insert(&mut self, key: String, entry: CacheEntry<V>) -> Option<CacheEntry<V>> {
        self.entries.insert(key, entry)
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        self.entries.remove(key)
    }

    fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

// == IndexMap Backing ==
/// Alternative backing store over `indexmap::IndexMap`.
///
/// `swap_remove` would disturb insertion order, so removal uses
/// `shift_remove`; removal cost is O(n) in exchange for stable order.
#[derive(Debug)]
pub struct IndexMapBacking<V> {
    entries: IndexMap<String, CacheEntry<V>>,
}

impl<V> Default for IndexMapBacking<V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<V> EntryMap<V> for IndexMapBacking<V> {
    fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut CacheEntry<V>> {
        self.entries.get_mut(key)
    }

    fn insert(&mut self, key: String, entry: CacheEntry<V>) -> Option<CacheEntry<V>> {
        self.entries.insert(key, entry)
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        self.entries.shift_remove(key)
    }

    fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
