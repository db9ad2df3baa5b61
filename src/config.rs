//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const SECS_PER_DAY: u64 = 24 * 60 * 60;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Default eviction target as a fraction of `max_size_bytes`.
pub const DEFAULT_EVICTION_TARGET: f64 = 0.8;

/// Cache configuration parameters.
///
/// Fixed at construction. All values can be configured via environment
/// variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one file per entry
    pub cache_dir: PathBuf,
    /// Entry age after which it is treated as a miss
    pub expiry: Duration,
    /// Aggregate on-disk size that triggers eviction
    pub max_size_bytes: u64,
    /// Fraction of `max_size_bytes` that eviction shrinks the cache to
    pub eviction_target: f64,
    /// Interval between scheduled expiry cleanups
    pub cleanup_interval: Duration,
}

impl Config {
    /// Creates a config with the given root, expiry window and size budget.
    ///
    /// Remaining parameters take their defaults.
    pub fn new(cache_dir: impl Into<PathBuf>, expiry: Duration, max_size_bytes: u64) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            expiry,
            max_size_bytes,
            ..Self::default()
        }
    }

    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DIR` - Cache root directory (default: `cache`)
    /// - `CACHE_EXPIRY_DAYS` - Expiry window in days (default: 30)
    /// - `MAX_CACHE_SIZE_MB` - Size budget in MiB (default: 100)
    /// - `CACHE_EVICTION_TARGET` - Eviction hysteresis fraction (default: 0.8)
    /// - `CACHE_CLEANUP_INTERVAL` - Scheduled cleanup frequency in seconds (default: 3600)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let expiry_days: u64 = env::var("CACHE_EXPIRY_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let max_size_mb: u64 = env::var("MAX_CACHE_SIZE_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        Self {
            cache_dir: env::var("CACHE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            expiry: Duration::from_secs(expiry_days.saturating_mul(SECS_PER_DAY)),
            max_size_bytes: max_size_mb.saturating_mul(BYTES_PER_MB),
            eviction_target: env::var("CACHE_EVICTION_TARGET")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(clamp_target)
                .unwrap_or(defaults.eviction_target),
            cleanup_interval: env::var("CACHE_CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Overrides the eviction target fraction, clamped to `0.0..=1.0`.
    pub fn with_eviction_target(mut self, target: f64) -> Self {
        self.eviction_target = clamp_target(target);
        self
    }

    /// Overrides the scheduled cleanup interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Size eviction shrinks the cache down to.
    pub fn eviction_target_bytes(&self) -> u64 {
        (self.max_size_bytes as f64 * self.eviction_target) as u64
    }
}

fn clamp_target(target: f64) -> f64 {
    if target.is_nan() {
        DEFAULT_EVICTION_TARGET
    } else {
        target.clamp(0.0, 1.0)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            expiry: Duration::from_secs(30 * SECS_PER_DAY),
            max_size_bytes: 100 * BYTES_PER_MB,
            eviction_target: DEFAULT_EVICTION_TARGET,
            cleanup_interval: Duration::from_secs(3600),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_dir, PathBuf::from("cache"));
        assert_eq!(config.expiry, Duration::from_secs(30 * 86_400));
        assert_eq!(config.max_size_bytes, 100 * 1024 * 1024);
        assert_eq!(config.eviction_target, 0.8);
        assert_eq!(config.cleanup_interval, Duration::from_secs(3600));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_DIR");
        env::remove_var("CACHE_EXPIRY_DAYS");
        env::remove_var("MAX_CACHE_SIZE_MB");
        env::remove_var("CACHE_EVICTION_TARGET");
        env::remove_var("CACHE_CLEANUP_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.cache_dir, PathBuf::from("cache"));
        assert_eq!(config.expiry, Duration::from_secs(30 * 86_400));
        assert_eq!(config.max_size_bytes, 100 * 1024 * 1024);
        assert_eq!(config.eviction_target, 0.8);
        assert_eq!(config.cleanup_interval, Duration::from_secs(3600));
    }

    #[test]
    fn test_eviction_target_is_clamped() {
        let config = Config::new("c", Duration::from_secs(1), 1000).with_eviction_target(1.7);
        assert_eq!(config.eviction_target, 1.0);

        let config = config.with_eviction_target(-0.5);
        assert_eq!(config.eviction_target, 0.0);

        let config = config.with_eviction_target(f64::NAN);
        assert_eq!(config.eviction_target, DEFAULT_EVICTION_TARGET);
    }

    #[test]
    fn test_eviction_target_bytes() {
        let config = Config::new("c", Duration::from_secs(1), 1000);
        assert_eq!(config.eviction_target_bytes(), 800);

        let config = config.with_eviction_target(0.5);
        assert_eq!(config.eviction_target_bytes(), 500);
    }
}
