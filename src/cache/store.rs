//! Cache Store Module
//!
//! Main cache engine combining the backing entry map with recency tracking,
//! TTL expiration, capacity eviction, statistics, and lifecycle events.
//!
//! Every removal, whatever its trigger, goes through `take_entry`, which
//! updates the entry map, the order index, and the memory accounting
//! together. The three structures therefore cannot diverge.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use chrono::Utc;

use crate::cache::{
    CacheEntry, CacheEvent, CacheSnapshot, CacheStats, EntryMap, EventKind, EvictionReason,
    HashMapBacking, ListenerId, ListenerRegistry, OrderIndex, SnapshotConfig, SnapshotEntry,
};
use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::Result;

/// Residency state of a key at a given instant.
enum Probe {
    Absent,
    Expired,
    Live,
}

// == Cache ==
/// In-process key/value cache with LRU eviction and TTL expiry.
///
/// Single-threaded by construction: all operations take `&mut self` and run
/// to completion. Share behind a lock (see [`SharedCache`](crate::SharedCache))
/// when multiple tasks need access.
#[derive(Debug)]
pub struct Cache<V, M: EntryMap<V> = HashMapBacking<V>> {
    /// Key-value storage
    entries: M,
    /// Recency order over resident keys
    order: OrderIndex,
    /// Engine configuration
    config: CacheConfig,
    /// Running sum of estimated entry sizes
    mem_used: usize,
    /// Per-value size estimator; entries carry no estimate without one
    size_of: Option<fn(&V) -> usize>,
    /// Performance statistics
    stats: CacheStats,
    /// Lifecycle event listeners
    listeners: ListenerRegistry,
    /// Time source for all expiry decisions
    clock: Arc<dyn Clock>,
}

impl<V, M: EntryMap<V>> Cache<V, M> {
    // == Constructors ==
    /// Creates a cache from a configuration, using the system clock.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidConfig`](crate::CacheError::InvalidConfig)
    /// when neither limit is configured; no partially-built cache is returned.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache with an explicit clock (deterministic tests).
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let stats = CacheStats::new(config.enable_stats);

        Ok(Self {
            entries: M::default(),
            order: OrderIndex::new(),
            config,
            mem_used: 0,
            size_of: None,
            stats,
            listeners: ListenerRegistry::new(),
            clock,
        })
    }

    /// Attaches a size estimator, enabling memory accounting for new entries.
    ///
    /// Required for `max_memory_bytes` to have any effect; without it every
    /// entry is accounted as zero bytes.
    pub fn with_size_of(mut self, size_of: fn(&V) -> usize) -> Self {
        self.size_of = Some(size_of);
        self
    }

    /// Returns the configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current sum of estimated entry sizes in bytes.
    pub fn memory_used(&self) -> usize {
        self.mem_used
    }

    // == Set ==
    /// Stores a key-value pair using the configured default TTL.
    ///
    /// An existing key is updated in place and becomes most recently used.
    /// A new key may trigger evictions first; the insert itself always
    /// succeeds.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        self.set_internal(key.into(), value, None);
    }

    /// Stores a key-value pair with an explicit TTL in milliseconds.
    ///
    /// The override is remembered on the entry and reused by sliding resets.
    pub fn set_with_ttl(&mut self, key: impl Into<String>, value: V, ttl_ms: u64) {
        self.set_internal(key.into(), value, Some(ttl_ms));
    }

    /// Stores many pairs in iteration order.
    pub fn set_many(&mut self, pairs: impl IntoIterator<Item = (String, V)>) {
        for (key, value) in pairs {
            self.set_internal(key, value, None);
        }
    }

    fn set_internal(&mut self, key: String, value: V, ttl_override: Option<u64>) {
        let now = self.clock.now_ms();
        let ttl_ms = ttl_override.or(self.config.default_ttl_ms);
        let estimated = self.size_of.map(|f| f(&value));

        if let Some(entry) = self.entries.get_mut(&key) {
            // Update in place: count unchanged, recency moves to tail
            self.mem_used -= entry.size_or_zero();
            entry.replace(value, now, ttl_ms, self.config.max_ttl_ms, estimated);
            self.mem_used += entry.size_or_zero();
            let node = entry.node;
            self.order.move_to_tail(node);

            // A grown value can breach the memory limit. The updated key sits
            // at the tail, so head evictions cannot touch it; if it alone is
            // over the limit it stays, like an oversized insert.
            if let Some(max_memory) = self.config.max_memory_bytes {
                while self.mem_used > max_memory && self.entries.len() > 1 {
                    if !self.evict_head(EvictionReason::Memory) {
                        break;
                    }
                }
            }
        } else {
            self.make_room(estimated.unwrap_or(0));

            let node = self.order.push_tail(key.clone());
            let entry = CacheEntry::new(value, now, ttl_ms, self.config.max_ttl_ms, estimated, node);
            self.mem_used += entry.size_or_zero();
            self.entries.insert(key.clone(), entry);
        }

        if self.listeners.wants(EventKind::Set) {
            self.listeners.emit(&CacheEvent::keyed(EventKind::Set, &key));
        }
    }

    // == Get ==
    /// Retrieves a value, marking the key most recently used.
    ///
    /// An expired entry is removed on the spot (reported as an expiration)
    /// and the call counts as a miss. Under sliding TTL the entry's expiry is
    /// pushed to `now + ttl`, clamped to `created_at + max_ttl`.
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let now = self.clock.now_ms();

        match self.probe(key, now) {
            Probe::Absent => {
                self.stats.record_miss();
                None
            }
            Probe::Expired => {
                self.expire(key);
                self.stats.record_miss();
                None
            }
            Probe::Live => {
                let sliding = self.config.sliding_ttl;
                let max_ttl = self.config.max_ttl_ms;
                let mut result = None;
                if let Some(entry) = self.entries.get_mut(key) {
                    if sliding {
                        entry.slide(now, max_ttl);
                    }
                    let node = entry.node;
                    result = Some((node, entry.value.clone()));
                }
                let (node, value) = result?;
                self.order.move_to_tail(node);
                self.stats.record_hit();
                Some(value)
            }
        }
    }

    /// Retrieves many values; the result lines up with the input keys.
    pub fn get_many<'k>(&mut self, keys: impl IntoIterator<Item = &'k str>) -> Vec<Option<V>>
    where
        V: Clone,
    {
        keys.into_iter().map(|key| self.get(key)).collect()
    }

    // == Peek ==
    /// Retrieves a value without touching recency or sliding TTL.
    ///
    /// Still removes the entry if it turns out to be expired. Does not count
    /// toward hit/miss statistics.
    pub fn peek(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let now = self.clock.now_ms();

        match self.probe(key, now) {
            Probe::Absent => None,
            Probe::Expired => {
                self.expire(key);
                None
            }
            Probe::Live => self.entries.get(key).map(|entry| entry.value.clone()),
        }
    }

    // == Has ==
    /// Checks residency without updating recency (peek-like).
    pub fn has(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();

        match self.probe(key, now) {
            Probe::Absent => false,
            Probe::Expired => {
                self.expire(key);
                false
            }
            Probe::Live => true,
        }
    }

    /// Checks residency for many keys at once.
    pub fn has_many<'k>(&mut self, keys: impl IntoIterator<Item = &'k str>) -> Vec<bool> {
        keys.into_iter().map(|key| self.has(key)).collect()
    }

    // == Touch ==
    /// Marks a key most recently used without retrieving its value.
    ///
    /// Applies the same sliding-TTL reset as [`get`](Self::get). Returns
    /// whether the key was resident and unexpired.
    pub fn touch(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();

        match self.probe(key, now) {
            Probe::Absent => false,
            Probe::Expired => {
                self.expire(key);
                false
            }
            Probe::Live => {
                let sliding = self.config.sliding_ttl;
                let max_ttl = self.config.max_ttl_ms;
                let mut node = None;
                if let Some(entry) = self.entries.get_mut(key) {
                    if sliding {
                        entry.slide(now, max_ttl);
                    }
                    node = Some(entry.node);
                }
                if let Some(node) = node {
                    self.order.move_to_tail(node);
                }
                true
            }
        }
    }

    // == TTL Query ==
    /// Returns the remaining TTL for a resident, unexpired key.
    ///
    /// # Returns
    /// - `None` - key absent or expired (an expired entry is pruned)
    /// - `Some(None)` - key resident and never expires
    /// - `Some(Some(ms))` - key resident, expires in `ms` milliseconds
    pub fn ttl_remaining(&mut self, key: &str) -> Option<Option<u64>> {
        let now = self.clock.now_ms();

        match self.probe(key, now) {
            Probe::Absent => None,
            Probe::Expired => {
                self.expire(key);
                None
            }
            Probe::Live => self.entries.get(key).map(|entry| entry.ttl_remaining_ms(now)),
        }
    }

    // == Get Or Compute ==
    /// Returns the cached value, or computes, inserts, and returns it.
    ///
    /// The closure runs only on a miss. The computed value is stored with the
    /// default TTL.
    pub fn get_or_insert_with(&mut self, key: &str, compute: impl FnOnce() -> V) -> V
    where
        V: Clone,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = compute();
        self.set_internal(key.to_string(), value.clone(), None);
        value
    }

    /// Async variant of [`get_or_insert_with`](Self::get_or_insert_with).
    ///
    /// The future runs only on a miss; its result is inserted once it
    /// completes. Callers sequencing two lookups for the same absent key get
    /// two computations; in-flight deduplication is deliberately not provided.
    pub async fn get_or_compute<F, Fut>(&mut self, key: &str, compute: F) -> V
    where
        V: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = compute().await;
        self.set_internal(key.to_string(), value.clone(), None);
        value
    }

    // == Remove ==
    /// Removes an entry by key, returning whether a mapping was removed.
    ///
    /// An expired-but-unpruned entry still reports `true`.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.take_entry(key) {
            Some(_) => {
                if self.listeners.wants(EventKind::Delete) {
                    self.listeners
                        .emit(&CacheEvent::keyed(EventKind::Delete, key));
                }
                true
            }
            None => false,
        }
    }

    /// Removes many keys, returning how many were resident.
    pub fn remove_many<'k>(&mut self, keys: impl IntoIterator<Item = &'k str>) -> usize {
        keys.into_iter().filter(|key| self.remove(key)).count()
    }

    /// Removes every unexpired key matching the predicate; returns the count.
    ///
    /// Expired entries encountered along the way are pruned as expirations
    /// first, so the predicate only ever sees live keys.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&str) -> bool) -> usize {
        self.prune_expired();

        let matching: Vec<String> = self
            .order
            .iter()
            .filter(|key| predicate(key))
            .map(str::to_string)
            .collect();

        self.remove_many(matching.iter().map(String::as_str))
    }

    // == Retain ==
    /// Keeps entries matching the predicate, removing the rest as deletes.
    pub fn retain(&mut self, mut predicate: impl FnMut(&str, &V) -> bool) {
        self.prune_expired();

        let entries = &self.entries;
        let doomed: Vec<String> = self
            .order
            .iter()
            .filter(|key| match entries.get(key) {
                Some(entry) => !predicate(key, &entry.value),
                None => false,
            })
            .map(str::to_string)
            .collect();

        self.remove_many(doomed.iter().map(String::as_str));
    }

    // == Clear ==
    /// Removes all entries. Listeners and statistics survive.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.mem_used = 0;
        if self.listeners.wants(EventKind::Clear) {
            self.listeners.emit(&CacheEvent::cleared());
        }
    }

    // == Dispose ==
    /// Tears the cache down: entries, listeners, and counters all reset.
    ///
    /// Operations after disposal behave as on a freshly-built empty cache.
    pub fn dispose(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.mem_used = 0;
        self.listeners.clear();
        self.stats.reset();
    }

    // == Size ==
    /// Number of resident entries, after pruning expired ones.
    pub fn len(&mut self) -> usize {
        self.prune_expired();
        self.entries.len()
    }

    /// Whether the cache holds no unexpired entries.
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    // == Iteration ==
    /// Resident keys, least- to most-recently used. Fresh per call.
    pub fn keys(&mut self) -> Vec<String> {
        self.prune_expired();
        self.order.iter().map(str::to_string).collect()
    }

    /// Resident values in recency order.
    pub fn values(&mut self) -> Vec<V>
    where
        V: Clone,
    {
        self.prune_expired();
        let entries = &self.entries;
        self.order
            .iter()
            .filter_map(|key| entries.get(key).map(|e| e.value.clone()))
            .collect()
    }

    /// Resident key/value pairs in recency order.
    pub fn entries(&mut self) -> Vec<(String, V)>
    where
        V: Clone,
    {
        self.prune_expired();
        let entries = &self.entries;
        self.order
            .iter()
            .filter_map(|key| entries.get(key).map(|e| (key.to_string(), e.value.clone())))
            .collect()
    }

    /// Visits every resident entry in recency order.
    pub fn for_each(&mut self, mut visitor: impl FnMut(&str, &V)) {
        self.prune_expired();
        let entries = &self.entries;
        for key in self.order.iter() {
            if let Some(entry) = entries.get(key) {
                visitor(key, &entry.value);
            }
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, reporting each as an expiration.
    ///
    /// Called lazily by size/iteration operations and periodically by the
    /// background sweep task. Returns the number of entries removed.
    pub fn prune_expired(&mut self) -> usize {
        let now = self.clock.now_ms();

        let expired: Vec<String> = self
            .order
            .iter()
            .filter(|key| {
                self.entries
                    .get(key)
                    .map(|entry| entry.is_expired_at(now))
                    .unwrap_or(false)
            })
            .map(str::to_string)
            .collect();

        for key in &expired {
            self.expire(key);
        }
        expired.len()
    }

    // == Stats ==
    /// Returns a copy of the current statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// Zeroes all statistics counters.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // == Events ==
    /// Subscribes a listener to an event kind; the id unsubscribes it.
    pub fn on(
        &mut self,
        kind: EventKind,
        callback: impl FnMut(&CacheEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.listeners.on(kind, callback)
    }

    /// Unsubscribes a listener; returns whether it was registered.
    pub fn off(&mut self, kind: EventKind, id: ListenerId) -> bool {
        self.listeners.off(kind, id)
    }

    // == Private Helpers ==
    /// Classifies a key's residency as of `now`.
    fn probe(&self, key: &str, now: u64) -> Probe {
        match self.entries.get(key) {
            None => Probe::Absent,
            Some(entry) if entry.is_expired_at(now) => Probe::Expired,
            Some(_) => Probe::Live,
        }
    }

    /// Removes the entry and its order node together. The only removal path.
    fn take_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.order.remove(entry.node);
        self.mem_used -= entry.size_or_zero();
        Some(entry)
    }

    /// Removes an expired entry, reporting it as an expiration.
    fn expire(&mut self, key: &str) {
        if self.take_entry(key).is_some() {
            self.stats.record_expiration();
            if self.listeners.wants(EventKind::Expire) {
                self.listeners
                    .emit(&CacheEvent::keyed(EventKind::Expire, key));
            }
        }
    }

    /// Applies the eviction policy ahead of inserting a new key.
    ///
    /// Count limit first, then memory: count evictions free one slot per
    /// over-capacity unit; memory evictions continue until the incoming
    /// entry's size fits or nothing is left to evict. A single oversized
    /// entry is admitted over-limit when the store is otherwise empty.
    fn make_room(&mut self, incoming_size: usize) {
        if let Some(max_count) = self.config.max_count {
            while self.entries.len() >= max_count {
                if !self.evict_head(EvictionReason::Size) {
                    break;
                }
            }
        }

        if let Some(max_memory) = self.config.max_memory_bytes {
            while self.mem_used + incoming_size > max_memory && !self.entries.is_empty() {
                if !self.evict_head(EvictionReason::Memory) {
                    break;
                }
            }
        }
    }

    /// Evicts the least recently used entry; false when nothing is resident.
    fn evict_head(&mut self, reason: EvictionReason) -> bool {
        let key = match self.order.peek_head() {
            Some(key) => key.to_string(),
            None => return false,
        };

        self.take_entry(&key);
        self.stats.record_eviction();
        debug!(key = %key, ?reason, "evicted entry");
        if self.listeners.wants(EventKind::Evict) {
            self.listeners.emit(&CacheEvent::evicted(&key, reason));
        }
        true
    }
}

// == Snapshot Codec ==
impl<V, M: EntryMap<V>> Cache<V, M> {
    /// Exports configuration and all resident, unexpired entries.
    ///
    /// Entries are recorded least- to most-recently used, so an import
    /// reconstructs the same recency order.
    pub fn to_snapshot(&mut self) -> CacheSnapshot<V>
    where
        V: Clone,
    {
        self.prune_expired();

        let entries = &self.entries;
        let exported: Vec<SnapshotEntry<V>> = self
            .order
            .iter()
            .filter_map(|key| {
                entries.get(key).map(|entry| SnapshotEntry {
                    key: key.to_string(),
                    value: entry.value.clone(),
                    created_at: entry.created_at,
                    expires_at: entry.expires_at,
                    ttl_ms: entry.ttl_ms,
                    estimated_size: entry.estimated_size,
                })
            })
            .collect();

        CacheSnapshot {
            config: SnapshotConfig::from(&self.config),
            exported_at: Utc::now(),
            entries: exported,
        }
    }

    /// Reconstructs an engine from a snapshot, using the system clock.
    ///
    /// Entries whose recorded expiry has passed by import time are skipped.
    pub fn from_snapshot(snapshot: CacheSnapshot<V>) -> Result<Self> {
        Self::from_snapshot_with_clock(snapshot, Arc::new(SystemClock))
    }

    /// Reconstructs an engine from a snapshot with an explicit clock.
    pub fn from_snapshot_with_clock(
        snapshot: CacheSnapshot<V>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let mut cache = Self::with_clock(snapshot.config.to_cache_config(), clock)?;
        let now = cache.clock.now_ms();

        for entry in snapshot.entries {
            if entry.expires_at.is_some_and(|expires| now > expires) {
                continue;
            }
            cache.restore_entry(entry);
        }
        Ok(cache)
    }

    /// Re-inserts an exported entry with its original timestamps intact.
    fn restore_entry(&mut self, entry: SnapshotEntry<V>) {
        self.make_room(entry.estimated_size.unwrap_or(0));

        let node = self.order.push_tail(entry.key.clone());
        let restored = CacheEntry {
            value: entry.value,
            created_at: entry.created_at,
            expires_at: entry.expires_at,
            ttl_ms: entry.ttl_ms,
            estimated_size: entry.estimated_size,
            node,
        };
        self.mem_used += restored.size_or_zero();
        self.entries.insert(entry.key, restored);
    }
}
