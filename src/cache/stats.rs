//! Cache Statistics Module
//!
//! Point-in-time directory snapshot plus in-process counters for hits,
//! misses, evictions and self-healed corrupt entries.

use std::path::PathBuf;

use serde::Serialize;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// == Counters ==
/// Running counters kept by the cache instance under its lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct Counters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub corrupt_removed: u64,
}

impl Counters {
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Adds to the eviction counter.
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    /// Increments the corrupt-entry counter.
    pub fn record_corrupt(&mut self) {
        self.corrupt_removed += 1;
    }
}

// == Cache Stats ==
/// Snapshot of the cache directory and configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of entry files on disk
    pub total_files: usize,
    /// Entries still inside the expiry window
    pub valid_files: usize,
    /// Entries past the expiry window but not yet removed
    pub expired_files: usize,
    /// Aggregate size of all entry files in bytes
    pub total_size: u64,
    /// `total_size` in MiB, rounded to two decimals
    pub total_size_mb: f64,
    /// Directory currently in use, which may be the temporary fallback
    pub cache_dir: PathBuf,
    /// Configured expiry window in seconds
    pub expiry_secs: u64,
    /// Configured size budget in bytes
    pub max_size_bytes: u64,
    /// Loads that returned an entry
    pub hits: u64,
    /// Loads that returned nothing
    pub misses: u64,
    /// Entries removed by size eviction
    pub evictions: u64,
    /// Entries deleted because they failed to decode
    pub corrupt_removed: u64,
}

impl CacheStats {
    /// Fills in the counter fields.
    pub fn with_counters(mut self, counters: Counters) -> Self {
        self.hits = counters.hits;
        self.misses = counters.misses;
        self.evictions = counters.evictions;
        self.corrupt_removed = counters.corrupt_removed;
        self
    }

    /// Sets the total size and its rounded MiB figure.
    pub fn set_total_size(&mut self, bytes: u64) {
        self.total_size = bytes;
        self.total_size_mb = (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0;
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if nothing has been loaded.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_size, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut counters = Counters::default();
        counters.record_hit();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();

        let stats = CacheStats::default().with_counters(counters);
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_counters_carry_over() {
        let mut counters = Counters::default();
        counters.record_evictions(3);
        counters.record_corrupt();

        let stats = CacheStats::default().with_counters(counters);
        assert_eq!(stats.evictions, 3);
        assert_eq!(stats.corrupt_removed, 1);
    }

    #[test]
    fn test_total_size_mb_rounding() {
        let mut stats = CacheStats::default();
        stats.set_total_size(1024 * 1024 + 512 * 1024);
        assert_eq!(stats.total_size_mb, 1.5);

        stats.set_total_size(12_345);
        assert_eq!(stats.total_size_mb, 0.01);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = CacheStats::default();
        stats.total_files = 2;
        stats.cache_dir = PathBuf::from("/tmp/cache");

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["total_files"], 2);
        assert_eq!(json["cache_dir"], "/tmp/cache");
    }
}
