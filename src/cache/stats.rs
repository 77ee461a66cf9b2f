//! Cache Statistics Module
//!
//! Tracks cache performance metrics: hits, misses, evictions, expirations.
//!
//! Counting is switched on at construction time. When disabled, the recording
//! methods return before touching any counter, so a stats-free cache pays a
//! single branch per recording point.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful, non-expired retrievals
    pub hits: u64,
    /// Number of failed retrievals (key absent or expired)
    pub misses: u64,
    /// Number of entries evicted under capacity pressure
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    pub expirations: u64,
    /// Whether recording is active
    #[serde(skip)]
    enabled: bool,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a CacheStats with all counters at zero.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Whether recording is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        if self.enabled {
            self.hits += 1;
        }
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        if self.enabled {
            self.misses += 1;
        }
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        if self.enabled {
            self.evictions += 1;
        }
    }

    // == Record Expiration ==
    /// Increments the expiration counter.
    pub fn record_expiration(&mut self) {
        if self.enabled {
            self.expirations += 1;
        }
    }

    // == Reset ==
    /// Zeroes all counters, keeping the enabled flag.
    pub fn reset(&mut self) {
        *self = Self::new(self.enabled);
    }
}
