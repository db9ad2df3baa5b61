//! Background Tasks Module
//!
//! Contains maintenance tasks an owning application can schedule against a
//! shared cache.
//!
//! # Tasks
//! - Expiry Cleanup: Removes expired cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
