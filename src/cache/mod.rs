//! Cache Module
//!
//! Provides a persistent on-disk cache with TTL expiration and size-bounded
//! eviction of the oldest entries.

pub(crate) mod entry;
pub(crate) mod eviction;
mod key;
mod stats;
mod store;


// Re-export public types
pub use key::{derive_key, CacheKey, KEY_LENGTH};
pub use stats::CacheStats;
pub use store::LookupCache;

// == Public Constants ==
/// File extension of entry files
pub const ENTRY_EXTENSION: &str = "json";

/// Suffix of in-flight temporary write files
pub const TEMP_SUFFIX: &str = ".tmp";

/// Name prefix of the temporary directory used when the root is unusable
pub const FALLBACK_DIR_PREFIX: &str = "lookup_cache_";
