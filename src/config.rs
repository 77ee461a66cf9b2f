//! Configuration Module
//!
//! Engine configuration with builder-style setters, plus environment-variable
//! loading for the exploration binary.

use std::env;

use crate::error::{CacheError, Result};

/// Default sweep interval in milliseconds.
pub const DEFAULT_CLEANUP_INTERVAL_MS: u64 = 60_000;

// == Cache Config ==
/// Engine configuration parameters.
///
/// At least one of `max_count` or `max_memory_bytes` must be set; the engine
/// constructor rejects a configuration with neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of resident entries (LRU eviction above this)
    pub max_count: Option<usize>,
    /// Maximum sum of estimated entry sizes in bytes
    pub max_memory_bytes: Option<usize>,
    /// Default TTL in milliseconds for entries set without an explicit TTL
    pub default_ttl_ms: Option<u64>,
    /// Whether recency-updating reads reset an entry's TTL
    pub sliding_ttl: bool,
    /// Absolute ceiling on entry lifetime from creation, in milliseconds
    pub max_ttl_ms: Option<u64>,
    /// Whether a background sweep task should be spawned by [`SharedCache`](crate::SharedCache)
    pub auto_cleanup: bool,
    /// Background sweep interval in milliseconds
    pub cleanup_interval_ms: u64,
    /// Whether hit/miss/eviction/expiration counters are maintained
    pub enable_stats: bool,
}

impl CacheConfig {
    // == Constructor ==
    /// Creates a configuration with no limits set and all features off.
    ///
    /// The result is not valid until a limit is supplied via
    /// [`max_count`](Self::max_count) or [`max_memory_bytes`](Self::max_memory_bytes).
    pub fn new() -> Self {
        Self {
            max_count: None,
            max_memory_bytes: None,
            default_ttl_ms: None,
            sliding_ttl: false,
            max_ttl_ms: None,
            auto_cleanup: false,
            cleanup_interval_ms: DEFAULT_CLEANUP_INTERVAL_MS,
            enable_stats: false,
        }
    }

    // == Builder Setters ==
    /// Sets the maximum number of resident entries.
    pub fn max_count(mut self, count: usize) -> Self {
        self.max_count = Some(count);
        self
    }

    /// Sets the maximum total estimated size in bytes.
    pub fn max_memory_bytes(mut self, bytes: usize) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Sets the default TTL in milliseconds.
    pub fn default_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.default_ttl_ms = Some(ttl_ms);
        self
    }

    /// Enables sliding TTL.
    pub fn sliding_ttl(mut self, enabled: bool) -> Self {
        self.sliding_ttl = enabled;
        self
    }

    /// Sets the absolute lifetime ceiling in milliseconds.
    pub fn max_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.max_ttl_ms = Some(ttl_ms);
        self
    }

    /// Enables the background sweep task (used by `SharedCache`).
    pub fn auto_cleanup(mut self, enabled: bool) -> Self {
        self.auto_cleanup = enabled;
        self
    }

    /// Sets the background sweep interval in milliseconds.
    pub fn cleanup_interval_ms(mut self, interval_ms: u64) -> Self {
        self.cleanup_interval_ms = interval_ms;
        self
    }

    /// Enables statistics counters.
    pub fn enable_stats(mut self, enabled: bool) -> Self {
        self.enable_stats = enabled;
        self
    }

    // == Validation ==
    /// Checks that the configuration can actually bound the cache.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidConfig`] when neither `max_count` nor
    /// `max_memory_bytes` is set, or when a configured limit is zero in a way
    /// that makes the cache unusable.
    pub fn validate(&self) -> Result<()> {
        if self.max_count.is_none() && self.max_memory_bytes.is_none() {
            return Err(CacheError::InvalidConfig(
                "at least one of max_count or max_memory_bytes must be set".to_string(),
            ));
        }
        if self.max_count == Some(0) {
            return Err(CacheError::InvalidConfig(
                "max_count must be greater than zero".to_string(),
            ));
        }
        if self.max_memory_bytes == Some(0) {
            return Err(CacheError::InvalidConfig(
                "max_memory_bytes must be greater than zero".to_string(),
            ));
        }
        if self.cleanup_interval_ms == 0 {
            return Err(CacheError::InvalidConfig(
                "cleanup_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    // == Environment Loading ==
    /// Creates a configuration from environment variables, for the binary.
    ///
    /// # Environment Variables
    /// - `MAX_COUNT` - Maximum resident entries (default: 1000)
    /// - `MAX_MEMORY_BYTES` - Maximum total estimated size (unset by default)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (unset by default)
    /// - `SLIDING_TTL` - "1"/"true" to enable sliding TTL (default: off)
    /// - `MAX_TTL_MS` - Lifetime ceiling in milliseconds (unset by default)
    /// - `CLEANUP_INTERVAL_MS` - Sweep interval (default: 60000)
    pub fn from_env() -> Self {
        let mut config = Self::new();

        config.max_count = env::var("MAX_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(1000));
        config.max_memory_bytes = env::var("MAX_MEMORY_BYTES").ok().and_then(|v| v.parse().ok());
        config.default_ttl_ms = env::var("DEFAULT_TTL_MS").ok().and_then(|v| v.parse().ok());
        config.sliding_ttl = env::var("SLIDING_TTL")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        config.max_ttl_ms = env::var("MAX_TTL_MS").ok().and_then(|v| v.parse().ok());
        config.cleanup_interval_ms = env::var("CLEANUP_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CLEANUP_INTERVAL_MS);
        config.enable_stats = true;
        config.auto_cleanup = true;

        config
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new().max_count(1000)
    }
}
