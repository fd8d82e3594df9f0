//! Error types for the set-associative cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::cache::BoxError;

// == Cache Error Enum ==
/// Unified error type for cache retrieval and construction.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key rejected by its validation hook, fallback missing, or a zero set size
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The data source failed to produce a block
    #[error("Fallback failed: {source}")]
    FallbackFailed {
        #[source]
        source: BoxError,
    },

    /// The eviction policy returned a slot outside `[0, set_size)`
    #[error("Eviction policy returned index {index}, expected a slot in [0, {set_size})")]
    InvalidEvictionIndex { index: i64, set_size: usize },

    /// A set for the key already exists in the store
    #[error("Store insertion conflict: {0}")]
    StoreInsertionConflict(String),

    /// Configuration values that cannot build a cache
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    /// Wraps a data source failure, keeping the original cause as the error source.
    pub fn fallback(source: impl Into<BoxError>) -> Self {
        CacheError::FallbackFailed {
            source: source.into(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
