//! Expiry Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::cache::LookupCache;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between cleanup runs. Each run scans the cache directory on the blocking
/// thread pool, since the cache does synchronous file I/O under its lock.
///
/// # Arguments
/// * `cache` - Shared reference to the cache
/// * `interval` - Time between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(LookupCache::open(Config::from_env())?);
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(3600));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: Arc<LookupCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting expiry cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            let cache = cache.clone();
            let removed = match tokio::task::spawn_blocking(move || cache.cleanup_expired()).await {
                Ok(removed) => removed,
                Err(e) => {
                    error!(error = %e, "expiry cleanup run failed");
                    continue;
                }
            };

            if removed > 0 {
                info!("Expiry cleanup: removed {} expired entries", removed);
            } else {
                debug!("Expiry cleanup: no expired entries found");
            }
        }
    })
}
