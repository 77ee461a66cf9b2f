//! Stash - An embeddable in-memory key/value cache engine
//!
//! Provides LRU eviction, TTL expiration (fixed and sliding), statistics,
//! lifecycle events, and a portable snapshot format.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod namespace;
pub mod shared;
pub mod tasks;

pub use cache::{
    Cache, CacheEvent, CacheSnapshot, CacheStats, EntryMap, EventKind, EvictionReason,
    HashMapBacking, IndexMapBacking, ListenerId, SnapshotConfig, SnapshotEntry,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use namespace::Namespace;
pub use shared::SharedCache;
pub use tasks::spawn_sweep_task;
