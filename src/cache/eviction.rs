//! Eviction Module
//!
//! Directory scanning plus size-bounded and expiry-based removal of entry
//! files. Callers hold the cache lock for the duration of each pass.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use crate::cache::entry::EntryMeta;
use crate::cache::ENTRY_EXTENSION;
use crate::error::{CacheError, Result};

// == Entry File ==
/// An entry file found while scanning the cache directory.
#[derive(Debug, Clone)]
pub struct EntryFile {
    pub path: PathBuf,
    pub meta: EntryMeta,
}

/// Returns true if `path` names an entry file rather than a temp file.
pub fn is_entry_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION)
}

// == Scan ==
/// Lists the paths of all entry files in `dir`.
///
/// A missing directory yields an empty list. Unreadable directory items are
/// logged and skipped.
pub fn list_entry_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut paths = Vec::new();
    for item in read_dir {
        match item {
            Ok(item) => {
                let path = item.path();
                if is_entry_file(&path) {
                    paths.push(path);
                }
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "failed to read cache directory entry");
            }
        }
    }
    Ok(paths)
}

/// Lists the entry files in `dir` with their metadata.
///
/// Files whose metadata cannot be read are logged and skipped.
pub fn scan(dir: &Path) -> Result<Vec<EntryFile>> {
    let mut entries = Vec::new();
    for path in list_entry_paths(dir)? {
        match EntryMeta::read(&path) {
            Ok(meta) => entries.push(EntryFile { path, meta }),
            // Removed between listing and stat
            Err(e) if e.is_not_found() => {}
            Err(e) => warn!(path = %path.display(), error = %e, "failed to stat cache file"),
        }
    }
    Ok(entries)
}

/// Deletes a single entry file.
///
/// A file that is already gone counts as removed.
pub fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CacheError::Io(e)),
    }
}

// == Size Eviction ==
/// Removes the oldest entries until the total size is at most `target_bytes`.
///
/// Does nothing unless the total exceeds `max_bytes`. Entries are ordered by
/// modification time, ties broken by path. Returns the number of files
/// removed; files that fail to delete are logged and skipped.
pub fn evict_to_size(mut entries: Vec<EntryFile>, max_bytes: u64, target_bytes: u64) -> usize {
    let mut current: u64 = entries.iter().map(|e| e.meta.size).sum();
    if current <= max_bytes {
        return 0;
    }

    info!(
        total_size = current,
        max_size = max_bytes,
        target_size = target_bytes,
        "cache size limit exceeded, evicting oldest entries"
    );

    entries.sort_by(|a, b| {
        a.meta
            .modified
            .cmp(&b.meta.modified)
            .then_with(|| a.path.cmp(&b.path))
    });

    let mut removed = 0;
    for entry in entries {
        if current <= target_bytes {
            break;
        }
        match remove_file(&entry.path) {
            Ok(()) => {
                current = current.saturating_sub(entry.meta.size);
                removed += 1;
                debug!(path = %entry.path.display(), size = entry.meta.size, "evicted cache file");
            }
            Err(e) => {
                warn!(path = %entry.path.display(), error = %e, "failed to evict cache file");
            }
        }
    }

    info!(removed, total_size = current, "cache eviction finished");
    removed
}

// == Expiry Cleanup ==
/// Removes every entry whose age has reached `expiry`.
///
/// Returns the number of files removed.
pub fn remove_expired(entries: &[EntryFile], expiry: Duration) -> usize {
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in entries.iter().filter(|e| e.meta.is_expired(expiry, now)) {
        match remove_file(&entry.path) {
            Ok(()) => {
                removed += 1;
                debug!(path = %entry.path.display(), "removed expired cache file");
            }
            Err(e) => {
                warn!(path = %entry.path.display(), error = %e, "failed to remove expired cache file");
            }
        }
    }

    if removed > 0 {
        info!(removed, "cleaned up expired cache files");
    }
    removed
}
