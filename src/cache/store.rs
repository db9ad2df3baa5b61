//! Cache Store Module
//!
//! Main cache engine: one file per key under a root directory, atomic
//! temp-file-then-rename writes, TTL checks on every load and size eviction
//! after every save. A single mutex per instance serializes all directory
//! access within the process.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, error, info, warn};

use crate::cache::entry::{self, StoredEntry};
use crate::cache::eviction;
use crate::cache::stats::{CacheStats, Counters};
use crate::cache::{CacheKey, ENTRY_EXTENSION, FALLBACK_DIR_PREFIX, TEMP_SUFFIX};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Cache State ==
/// Everything guarded by the cache lock.
#[derive(Debug)]
struct CacheState {
    /// Directory currently holding entries
    root: PathBuf,
    /// Temporary directory in use after a failed bootstrap, removed on drop
    fallback: Option<TempDir>,
    counters: Counters,
}

impl CacheState {
    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{}.{}", key, ENTRY_EXTENSION))
    }

    // == Directory Bootstrap ==
    /// Makes sure the root directory exists.
    ///
    /// The first failure reassigns the root to a fresh temporary directory.
    /// Once on the fallback, failures are returned to the caller.
    fn ensure_dir(&mut self) -> Result<()> {
        if self.root.is_dir() {
            return Ok(());
        }

        let err = match fs::create_dir_all(&self.root) {
            Ok(()) => {
                info!(path = %self.root.display(), "created cache directory");
                return Ok(());
            }
            Err(e) => e,
        };

        if self.fallback.is_some() {
            return Err(CacheError::Unavailable {
                path: self.root.clone(),
                source: err,
            });
        }

        if err.kind() == std::io::ErrorKind::PermissionDenied {
            warn!(path = %self.root.display(), error = %err, "permission denied creating cache directory");
        } else {
            error!(path = %self.root.display(), error = %err, "failed to create cache directory");
        }

        let temp = tempfile::Builder::new()
            .prefix(FALLBACK_DIR_PREFIX)
            .tempdir()
            .map_err(|source| CacheError::Unavailable {
                path: std::env::temp_dir(),
                source,
            })?;
        self.root = temp.path().to_path_buf();
        self.fallback = Some(temp);
        warn!(path = %self.root.display(), "using temporary cache directory");
        Ok(())
    }

    // == Read ==
    fn read_entry<T: DeserializeOwned>(&self, path: &Path, key: &CacheKey) -> Result<T> {
        let bytes = fs::read(path)?;
        Ok(StoredEntry::<T>::decode(&bytes, key)?.payload)
    }

    // == Atomic Write ==
    /// Writes the entry to a temp file in the root, then renames it into place.
    fn write_entry<T: Serialize + ?Sized>(&mut self, key: &CacheKey, payload: &T) -> Result<PathBuf> {
        self.ensure_dir()?;

        let bytes = StoredEntry::new(key, payload).encode()?;
        let path = self.path_for(key);

        let mut temp = tempfile::Builder::new()
            .prefix(".")
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.root)?;

        let written = temp
            .write_all(&bytes)
            .and_then(|()| temp.as_file().sync_all());
        if let Err(e) = written {
            discard_temp(temp);
            return Err(e.into());
        }

        temp.persist(&path).map_err(|e| {
            discard_temp(e.file);
            CacheError::Io(e.error)
        })?;

        Ok(path)
    }

    // == Size Eviction ==
    fn evict_if_needed(&mut self, config: &Config) {
        let entries = match eviction::scan(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                error!(path = %self.root.display(), error = %e, "failed to scan cache for eviction");
                return;
            }
        };

        let removed =
            eviction::evict_to_size(entries, config.max_size_bytes, config.eviction_target_bytes());
        self.counters.record_evictions(removed);
    }
}

/// Removes a temp file left by a failed write, logging a failed removal.
fn discard_temp(temp: NamedTempFile) {
    let path = temp.path().to_path_buf();
    if let Err(e) = temp.close() {
        warn!(path = %path.display(), error = %e, "failed to remove temporary cache file");
    }
}

// == Lookup Cache ==
/// Persistent on-disk cache of opaque payloads.
///
/// Payloads are any serde-serializable value. Every operation reports
/// failures as a miss or `false` and logs the cause.
#[derive(Debug)]
pub struct LookupCache {
    config: Config,
    state: Mutex<CacheState>,
}

impl LookupCache {
    // == Constructor ==
    /// Opens a cache rooted at `config.cache_dir`, creating the directory.
    ///
    /// Falls back to a temporary directory if the root cannot be created.
    /// Fails only when neither location is usable.
    pub fn open(config: Config) -> Result<Self> {
        let mut state = CacheState {
            root: config.cache_dir.clone(),
            fallback: None,
            counters: Counters::default(),
        };
        state.ensure_dir()?;

        info!(
            path = %state.root.display(),
            expiry_secs = config.expiry.as_secs(),
            max_size_bytes = config.max_size_bytes,
            "cache opened"
        );

        Ok(Self {
            config,
            state: Mutex::new(state),
        })
    }

    /// Returns the configuration the cache was opened with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the directory currently in use.
    pub fn root(&self) -> PathBuf {
        self.state.lock().root.clone()
    }

    /// Returns true if the cache runs on the temporary fallback directory.
    pub fn is_fallback(&self) -> bool {
        self.state.lock().fallback.is_some()
    }

    /// Returns the file an entry for `key` is stored in.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.state.lock().path_for(key)
    }

    // == Load ==
    /// Loads the payload saved under `key`.
    ///
    /// Returns `None` if the entry is missing, expired or unreadable. An
    /// entry that fails to decode is deleted.
    pub fn load<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let mut state = self.state.lock();
        let path = state.path_for(key);

        if !entry::is_valid(&path, self.config.expiry) {
            debug!(key = %key, "cache miss");
            state.counters.record_miss();
            return None;
        }

        match state.read_entry::<T>(&path, key) {
            Ok(payload) => {
                debug!(key = %key, "cache hit");
                state.counters.record_hit();
                Some(payload)
            }
            Err(e) if e.is_not_found() => {
                debug!(key = %key, "cache entry vanished before read");
                state.counters.record_miss();
                None
            }
            Err(CacheError::Io(e)) => {
                warn!(key = %key, error = %e, "failed to read cache entry");
                state.counters.record_miss();
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "corrupt cache entry, removing");
                if let Err(e) = eviction::remove_file(&path) {
                    error!(path = %path.display(), error = %e, "failed to remove corrupt cache file");
                }
                state.counters.record_corrupt();
                state.counters.record_miss();
                None
            }
        }
    }

    // == Save ==
    /// Saves `payload` under `key`, replacing any previous entry.
    ///
    /// Runs size eviction afterwards. Returns false if the write failed.
    pub fn save<T: Serialize + ?Sized>(&self, key: &CacheKey, payload: &T) -> bool {
        let mut state = self.state.lock();

        match state.write_entry(key, payload) {
            Ok(path) => {
                info!(key = %key, path = %path.display(), "saved cache entry");
                state.evict_if_needed(&self.config);
                true
            }
            Err(e) => {
                error!(key = %key, error = %e, "failed to save cache entry");
                false
            }
        }
    }

    /// Loads the entry for `key`, computing and saving it on a miss.
    ///
    /// `compute` runs without the cache lock held. A failed save is logged
    /// and the computed value is still returned.
    pub fn get_or_insert_with<T, F>(&self, key: &CacheKey, compute: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(cached) = self.load(key) {
            return cached;
        }
        let value = compute();
        self.save(key, &value);
        value
    }

    // == Remove ==
    /// Deletes the entry for `key`. Returns true if a file was removed.
    pub fn remove(&self, key: &CacheKey) -> bool {
        let state = self.state.lock();
        let path = state.path_for(key);

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key = %key, "removed cache entry");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to remove cache entry");
                false
            }
        }
    }

    // == Clear ==
    /// Deletes every entry.
    ///
    /// Per-file failures are logged and skipped. Returns false only if the
    /// directory cannot be listed.
    pub fn clear(&self) -> bool {
        let state = self.state.lock();

        let paths = match eviction::list_entry_paths(&state.root) {
            Ok(paths) => paths,
            Err(e) => {
                error!(path = %state.root.display(), error = %e, "failed to list cache directory");
                return false;
            }
        };

        let mut removed = 0;
        for path in paths {
            match eviction::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => error!(path = %path.display(), error = %e, "failed to remove cache file"),
            }
        }

        info!(removed, "cleared cache");
        true
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let state = self.state.lock();

        match eviction::scan(&state.root) {
            Ok(entries) => eviction::remove_expired(&entries, self.config.expiry),
            Err(e) => {
                error!(path = %state.root.display(), error = %e, "failed to scan cache for expired entries");
                0
            }
        }
    }

    // == Stats ==
    /// Returns a consistent snapshot of the cache directory and counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();

        let mut stats = CacheStats {
            cache_dir: state.root.clone(),
            expiry_secs: self.config.expiry.as_secs(),
            max_size_bytes: self.config.max_size_bytes,
            ..CacheStats::default()
        }
        .with_counters(state.counters);

        let entries = match eviction::scan(&state.root) {
            Ok(entries) => entries,
            Err(e) => {
                error!(path = %state.root.display(), error = %e, "failed to scan cache for stats");
                return stats;
            }
        };

        let now = std::time::SystemTime::now();
        let mut total_size = 0;
        for entry in &entries {
            total_size += entry.meta.size;
            if entry.meta.is_expired(self.config.expiry, now) {
                stats.expired_files += 1;
            } else {
                stats.valid_files += 1;
            }
        }
        stats.total_files = entries.len();
        stats.set_total_size(total_size);
        stats
    }
}
