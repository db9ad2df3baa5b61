//! Error types for the lookup cache
//!
//! Provides unified error handling using thiserror. These errors stay inside
//! the crate: public cache operations log them and report a miss or a failure
//! instead. Only construction surfaces a `CacheError` to the caller.

use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the lookup cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Entry file holds an envelope written for another key
    #[error("Key mismatch: expected {expected}, found {found}")]
    KeyMismatch { expected: String, found: String },

    /// String is not a well-formed cache key
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    /// Neither the configured root nor the temporary fallback is writable
    #[error("Cache directory unavailable: {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CacheError {
    /// Returns true if the error is an I/O `NotFound`.
    ///
    /// Eviction and cleanup treat these as already-done work when a file
    /// disappears between listing and deletion.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

// == Result Type Alias ==
/// Convenience Result type for the lookup cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_is_not_found() {
        let err = CacheError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.is_not_found());

        let err = CacheError::from(io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert!(!err.is_not_found());

        assert!(!CacheError::InvalidKey("x".to_string()).is_not_found());
    }

    #[test]
    fn test_display_messages() {
        let err = CacheError::KeyMismatch {
            expected: "aa".to_string(),
            found: "bb".to_string(),
        };
        assert_eq!(err.to_string(), "Key mismatch: expected aa, found bb");

        let err = CacheError::Unavailable {
            path: PathBuf::from("/nope"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/nope"));
    }
}
