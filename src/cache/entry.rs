//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.
//!
//! `created_at` is immutable after creation and anchors the max-TTL ceiling:
//! no matter how often a sliding reset pushes `expires_at` forward, it never
//! passes `created_at + max_ttl`.

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (clock milliseconds), immutable post-creation
    pub created_at: u64,
    /// Expiration timestamp (clock milliseconds), None = no expiration
    pub expires_at: Option<u64>,
    /// TTL applied at creation, reused by sliding resets
    pub ttl_ms: Option<u64>,
    /// Estimated size in bytes, None when no estimator is configured
    pub estimated_size: Option<usize>,
    /// Handle of this entry's node in the recency order index
    pub(crate) node: usize,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// The effective expiry is `now + ttl_ms` when a TTL applies, clamped to
    /// `now + max_ttl_ms` when a ceiling is configured. A configured ceiling
    /// bounds the lifetime of entries without any TTL of their own as well.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `now` - Current clock time in milliseconds
    /// * `ttl_ms` - TTL in milliseconds (None = no TTL)
    /// * `max_ttl_ms` - Absolute lifetime ceiling (None = unbounded)
    /// * `estimated_size` - Size estimate in bytes, if an estimator ran
    /// * `node` - Handle of the entry's order-index node
    pub(crate) fn new(
        value: V,
        now: u64,
        ttl_ms: Option<u64>,
        max_ttl_ms: Option<u64>,
        estimated_size: Option<usize>,
        node: usize,
    ) -> Self {
        let expires_at = Self::expiry_for(now, now, ttl_ms, max_ttl_ms);

        Self {
            value,
            created_at: now,
            expires_at,
            ttl_ms,
            estimated_size,
            node,
        }
    }

    /// Computes an expiry for an entry created at `created_at`, as of `now`.
    fn expiry_for(
        created_at: u64,
        now: u64,
        ttl_ms: Option<u64>,
        max_ttl_ms: Option<u64>,
    ) -> Option<u64> {
        let from_ttl = ttl_ms.map(|ttl| now.saturating_add(ttl));
        let ceiling = max_ttl_ms.map(|max| created_at.saturating_add(max));

        match (from_ttl, ceiling) {
            (Some(e), Some(c)) => Some(e.min(c)),
            (Some(e), None) => Some(e),
            (None, Some(c)) => Some(c),
            (None, None) => None,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is expired as of `now`.
    ///
    /// An entry is expired strictly after its expiry instant: at
    /// `now == expires_at` it is still visible.
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    // == Sliding Reset ==
    /// Recomputes the expiry after a recency-updating read under sliding TTL.
    ///
    /// The reset reuses the TTL the entry was created with and is clamped to
    /// `created_at + max_ttl_ms`; once the ceiling has passed, further resets
    /// cannot revive the entry. Entries without a TTL of their own are left
    /// unchanged.
    pub(crate) fn slide(&mut self, now: u64, max_ttl_ms: Option<u64>) {
        if self.ttl_ms.is_some() {
            self.expires_at = Self::expiry_for(self.created_at, now, self.ttl_ms, max_ttl_ms);
        }
    }

    /// Replaces value and expiry in place, keeping `created_at` intact.
    pub(crate) fn replace(
        &mut self,
        value: V,
        now: u64,
        ttl_ms: Option<u64>,
        max_ttl_ms: Option<u64>,
        estimated_size: Option<usize>,
    ) {
        self.value = value;
        self.ttl_ms = ttl_ms;
        self.estimated_size = estimated_size;
        self.expires_at = Self::expiry_for(self.created_at, now, ttl_ms, max_ttl_ms);
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds as of `now`.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has an expiry that has passed
    /// - `Some(remaining_ms)` if the entry has an expiry in the future
    /// - `None` if the entry never expires
    pub fn ttl_remaining_ms(&self, now: u64) -> Option<u64> {
        self.expires_at.map(|expires| expires.saturating_sub(now))
    }

    /// Estimated size in bytes, treating a missing estimate as zero.
    pub fn size_or_zero(&self) -> usize {
        self.estimated_size.unwrap_or(0)
    }
}
