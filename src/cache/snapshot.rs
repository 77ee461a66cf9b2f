//! Snapshot Codec Module
//!
//! Serializable form of a cache: its configuration plus every resident,
//! unexpired entry in recency order (least- to most-recently used). The
//! structures here are plain data; export and import live on
//! [`Cache`](crate::Cache) itself.
//!
//! Timestamps inside entries are clock milliseconds from the source engine's
//! clock; `exported_at` is wall-clock metadata for humans and tooling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{CacheConfig, DEFAULT_CLEANUP_INTERVAL_MS};

// == Snapshot Config ==
/// The configuration a snapshot carries across the codec boundary.
///
/// Operational settings (sweep interval, stats switch) are deliberately not
/// part of a snapshot; the importer decides those.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    pub max_count: Option<usize>,
    pub max_memory_bytes: Option<usize>,
    pub default_ttl_ms: Option<u64>,
    pub sliding_ttl: bool,
    pub max_ttl_ms: Option<u64>,
}

impl From<&CacheConfig> for SnapshotConfig {
    fn from(config: &CacheConfig) -> Self {
        Self {
            max_count: config.max_count,
            max_memory_bytes: config.max_memory_bytes,
            default_ttl_ms: config.default_ttl_ms,
            sliding_ttl: config.sliding_ttl,
            max_ttl_ms: config.max_ttl_ms,
        }
    }
}

impl SnapshotConfig {
    /// Rebuilds an engine configuration, with operational settings at their
    /// defaults.
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_count: self.max_count,
            max_memory_bytes: self.max_memory_bytes,
            default_ttl_ms: self.default_ttl_ms,
            sliding_ttl: self.sliding_ttl,
            max_ttl_ms: self.max_ttl_ms,
            auto_cleanup: false,
            cleanup_interval_ms: DEFAULT_CLEANUP_INTERVAL_MS,
            enable_stats: false,
        }
    }
}

// == Snapshot Entry ==
/// One exported entry, with enough metadata to reconstruct it exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry<V> {
    pub key: String,
    pub value: V,
    pub created_at: u64,
    pub expires_at: Option<u64>,
    /// TTL the entry was created with, so sliding resets keep working
    pub ttl_ms: Option<u64>,
    pub estimated_size: Option<usize>,
}

// == Cache Snapshot ==
/// A transportable image of a cache at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot<V> {
    pub config: SnapshotConfig,
    pub exported_at: DateTime<Utc>,
    /// Resident entries, least- to most-recently used
    pub entries: Vec<SnapshotEntry<V>>,
}
