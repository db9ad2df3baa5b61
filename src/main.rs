//! Lookup Cache - maintenance runner
//!
//! Opens the cache described by the environment, reports its state and keeps
//! expired entries cleaned up until shut down.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lookup_cache::{spawn_cleanup_task, Config, LookupCache};

/// Main entry point for the cache maintenance runner.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the cache, falling back to a temp directory if needed
/// 4. Remove already-expired entries and log a stats snapshot
/// 5. Start the periodic expiry cleanup task
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lookup_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting lookup cache maintenance");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_dir={}, expiry={}s, max_size={}B, cleanup_interval={}s",
        config.cache_dir.display(),
        config.expiry.as_secs(),
        config.max_size_bytes,
        config.cleanup_interval.as_secs()
    );

    let interval = config.cleanup_interval;
    let cache = Arc::new(LookupCache::open(config).context("failed to open cache")?);

    let startup = {
        let cache = cache.clone();
        tokio::task::spawn_blocking(move || {
            let removed = cache.cleanup_expired();
            (removed, cache.stats())
        })
        .await
        .context("startup cleanup failed")?
    };
    let (removed, stats) = startup;
    info!(
        removed,
        total_files = stats.total_files,
        valid_files = stats.valid_files,
        total_size_mb = stats.total_size_mb,
        cache_dir = %stats.cache_dir.display(),
        "Cache ready"
    );

    let cleanup_handle = spawn_cleanup_task(cache, interval);
    info!("Background cleanup task started");

    shutdown_signal().await?;

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() -> anyhow::Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<(), anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<anyhow::Result<()>>();

    tokio::select! {
        result = ctrl_c => {
            result?;
            info!("Received Ctrl+C, initiating shutdown...");
        }
        result = terminate => {
            result?;
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
    Ok(())
}
