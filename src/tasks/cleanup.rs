//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.
//!
//! The sweep takes the same write lock as every foreground operation, so a
//! pass is atomic with respect to any single operation: nothing ever observes
//! a partially-swept cache. Aborting the returned handle cancels the task;
//! the task holds no resources that would keep an idle process alive beyond
//! its runtime.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{Cache, EntryMap};

/// Spawns a background task that periodically prunes expired entries.
///
/// The task sleeps for the given interval between passes. Abort the returned
/// handle to cancel it, e.g. during disposal or graceful shutdown.
///
/// # Arguments
/// * `cache` - Shared cache to sweep
/// * `interval_ms` - Milliseconds between sweep passes
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(Cache::new(config)?));
/// let sweep_handle = spawn_sweep_task(cache.clone(), 60_000);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<V, M>(
    cache: Arc<RwLock<Cache<V, M>>>,
    interval_ms: u64,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
    M: EntryMap<V> + Send + Sync + 'static,
{
    let interval = Duration::from_millis(interval_ms);

    tokio::spawn(async move {
        info!("Starting TTL sweep task with interval of {} ms", interval_ms);

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.prune_expired()
            };

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}
