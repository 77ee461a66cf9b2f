//! Cache Module
//!
//! The cache engine: entry storage, recency order, TTL expiry, eviction,
//! statistics, lifecycle events, and the snapshot codec.

mod backing;
mod entry;
mod events;
mod lru;
mod snapshot;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backing::{EntryMap, HashMapBacking, IndexMapBacking};
pub use entry::CacheEntry;
pub use events::{CacheEvent, EventKind, EvictionReason, ListenerId, ListenerRegistry};
pub use lru::OrderIndex;
pub use snapshot::{CacheSnapshot, SnapshotConfig, SnapshotEntry};
pub use stats::CacheStats;
pub use store::Cache;
