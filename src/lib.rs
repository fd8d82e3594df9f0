//! Assoc Cache - An in-process set-associative cache
//!
//! Maps each key to a bounded, ordered set of blocks. Callers decide which
//! blocks are still valid, supply an async fallback for refills, and inject
//! the policy that picks which slot a full set overwrites.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheKey, CacheStats, EvictionPolicy, SetAssociativeCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::spawn_stats_reporter;
