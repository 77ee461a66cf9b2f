//! Shared Cache Module
//!
//! Wraps the single-threaded engine in `Arc<RwLock<..>>` for use from async
//! tasks, and owns the optional background sweep task. This is the type the
//! exploration binary and most embedding applications hold.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::{Cache, CacheStats, EntryMap, HashMapBacking};
use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::spawn_sweep_task;

// == Shared Cache ==
/// A lock-guarded cache handle with an attached sweep task.
///
/// When the configuration enables `auto_cleanup`, construction spawns the
/// sweep task (and therefore must happen inside a tokio runtime).
/// [`dispose`](Self::dispose) aborts the sweep and clears the engine;
/// dropping the handle aborts the sweep as well.
#[derive(Debug)]
pub struct SharedCache<V, M = HashMapBacking<V>>
where
    M: EntryMap<V>,
{
    inner: Arc<RwLock<Cache<V, M>>>,
    sweep: Option<JoinHandle<()>>,
}

impl<V, M> SharedCache<V, M>
where
    V: Send + Sync + 'static,
    M: EntryMap<V> + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a shared cache, spawning the sweep task if configured.
    pub fn new(config: CacheConfig) -> Result<Self> {
        let auto_cleanup = config.auto_cleanup;
        let interval_ms = config.cleanup_interval_ms;
        let cache = Cache::new(config)?;
        Ok(Self::wrap(cache, auto_cleanup, interval_ms))
    }

    /// Creates a shared cache with an explicit clock.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let auto_cleanup = config.auto_cleanup;
        let interval_ms = config.cleanup_interval_ms;
        let cache = Cache::with_clock(config, clock)?;
        Ok(Self::wrap(cache, auto_cleanup, interval_ms))
    }

    /// Wraps an already-built engine, honoring its sweep configuration.
    pub fn from_cache(cache: Cache<V, M>) -> Self {
        let auto_cleanup = cache.config().auto_cleanup;
        let interval_ms = cache.config().cleanup_interval_ms;
        Self::wrap(cache, auto_cleanup, interval_ms)
    }

    fn wrap(cache: Cache<V, M>, auto_cleanup: bool, interval_ms: u64) -> Self {
        let inner = Arc::new(RwLock::new(cache));
        let sweep = auto_cleanup.then(|| spawn_sweep_task(Arc::clone(&inner), interval_ms));

        Self { inner, sweep }
    }

    /// Clones the underlying lock-guarded engine handle.
    ///
    /// Useful for passing the cache into tasks without the sweep ownership.
    pub fn cache(&self) -> Arc<RwLock<Cache<V, M>>> {
        Arc::clone(&self.inner)
    }

    /// Whether a sweep task is currently attached.
    pub fn has_sweep(&self) -> bool {
        self.sweep.as_ref().is_some_and(|h| !h.is_finished())
    }

    // == Forwarded Operations ==
    /// See [`Cache::set`].
    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.inner.write().await.set(key, value);
    }

    /// See [`Cache::set_with_ttl`].
    pub async fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl_ms: u64) {
        self.inner.write().await.set_with_ttl(key, value, ttl_ms);
    }

    /// See [`Cache::get`].
    pub async fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.inner.write().await.get(key)
    }

    /// See [`Cache::peek`].
    pub async fn peek(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.inner.write().await.peek(key)
    }

    /// See [`Cache::has`].
    pub async fn has(&self, key: &str) -> bool {
        self.inner.write().await.has(key)
    }

    /// See [`Cache::remove`].
    pub async fn remove(&self, key: &str) -> bool {
        self.inner.write().await.remove(key)
    }

    /// See [`Cache::ttl_remaining`].
    pub async fn ttl_remaining(&self, key: &str) -> Option<Option<u64>> {
        self.inner.write().await.ttl_remaining(key)
    }

    /// See [`Cache::len`].
    pub async fn len(&self) -> usize {
        self.inner.write().await.len()
    }

    /// See [`Cache::keys`].
    pub async fn keys(&self) -> Vec<String> {
        self.inner.write().await.keys()
    }

    /// See [`Cache::clear`].
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// See [`Cache::stats`].
    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    /// See [`Cache::prune_expired`].
    pub async fn prune_expired(&self) -> usize {
        self.inner.write().await.prune_expired()
    }

    // == Dispose ==
    /// Cancels the sweep task and tears the engine down.
    pub async fn dispose(&mut self) {
        if let Some(handle) = self.sweep.take() {
            handle.abort();
            info!("Sweep task aborted");
        }
        self.inner.write().await.dispose();
    }
}

impl<V, M: EntryMap<V>> Drop for SharedCache<V, M> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweep.take() {
            handle.abort();
        }
    }
}
