//! Cache Module
//!
//! Provides the set-associative cache: per-key bounded block sets, tag-checked
//! retrieval, async refill on miss and pluggable slot eviction.

mod associative;
mod fallback;
mod inflight;
mod key;
mod policy;
mod set;
mod stats;
mod store;


// Re-export public types
pub use associative::SetAssociativeCache;
pub use fallback::BoxError;
pub use key::CacheKey;
pub use policy::{resolve_index, EvictionPolicy, FirstSlot, LastSlot, PolicyKind, RoundRobin};
pub use set::CacheSet;
pub use stats::CacheStats;
pub use store::{SetStore, SharedSet};

// == Public Constants ==
/// Maximum allowed length in bytes for string keys
pub const MAX_KEY_LENGTH: usize = 256;
