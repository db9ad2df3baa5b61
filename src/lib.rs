//! Lookup Cache - A persistent on-disk cache for expensive lookup results
//!
//! Stores the results of slow, non-deterministic calls (AI normalization, web
//! lookups) keyed by a normalized item description, with TTL expiration,
//! size-bounded eviction and self-healing of corrupt entries.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{derive_key, CacheKey, CacheStats, LookupCache};
pub use config::Config;
pub use error::CacheError;
pub use tasks::spawn_cleanup_task;
