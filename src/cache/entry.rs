//! Cache Entry Module
//!
//! Defines the on-disk envelope of an entry and the TTL validity check.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::CacheKey;
use crate::error::{CacheError, Result};

// == Stored Entry ==
/// Envelope written to disk around the caller's payload.
///
/// The payload itself is opaque to the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry<T> {
    /// Key the entry was saved under
    pub key: String,
    /// Wall-clock time of the save
    pub saved_at: DateTime<Utc>,
    /// Caller-supplied data
    pub payload: T,
}

impl<T> StoredEntry<T> {
    // == Constructor ==
    /// Wraps a payload for the given key, stamped with the current time.
    pub fn new(key: &CacheKey, payload: T) -> Self {
        Self {
            key: key.to_string(),
            saved_at: Utc::now(),
            payload,
        }
    }
}

impl<T: Serialize> StoredEntry<T> {
    /// Encodes the envelope.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl<T: DeserializeOwned> StoredEntry<T> {
    /// Decodes an envelope and checks it belongs to `key`.
    ///
    /// Any failure here marks the file as corrupt.
    pub fn decode(bytes: &[u8], key: &CacheKey) -> Result<Self> {
        let entry: Self = serde_json::from_slice(bytes)?;
        if entry.key != key.as_str() {
            return Err(CacheError::KeyMismatch {
                expected: key.to_string(),
                found: entry.key,
            });
        }
        Ok(entry)
    }
}

// == File Metadata ==
/// Size and modification time of an entry file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub size: u64,
    pub modified: SystemTime,
}

impl EntryMeta {
    /// Reads the metadata of the file at `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            size: meta.len(),
            modified: meta.modified()?,
        })
    }

    // == Is Expired ==
    /// Checks if the entry is past its expiry window.
    ///
    /// An entry is valid while `now < modified + expiry`. A modification
    /// time in the future counts as age zero.
    pub fn is_expired(&self, expiry: Duration, now: SystemTime) -> bool {
        let age = now.duration_since(self.modified).unwrap_or(Duration::ZERO);
        age >= expiry
    }
}

// == Validity Check ==
/// Returns true if the file at `path` exists and has not expired.
///
/// Fails closed: any error reading the metadata is reported as invalid.
pub fn is_valid(path: &Path, expiry: Duration) -> bool {
    match EntryMeta::read(path) {
        Ok(meta) => {
            let valid = !meta.is_expired(expiry, SystemTime::now());
            if !valid {
                debug!(path = %path.display(), "cache entry expired");
            }
            valid
        }
        Err(e) if e.is_not_found() => false,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to check cache entry validity");
            false
        }
    }
}
