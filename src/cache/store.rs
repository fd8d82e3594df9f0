//! Set Store Module
//!
//! Concurrent key-to-set mapping. Each set sits behind its own read/write
//! guard, so mutating one key never blocks readers of another.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::cache::{CacheKey, CacheSet};
use crate::error::{CacheError, Result};

/// A cache set shared between the store and in-progress retrievals.
pub type SharedSet<B> = Arc<RwLock<CacheSet<B>>>;

// == Set Store ==
/// Sharded map from key to its guarded cache set.
///
/// Sets are created once per key and never removed.
#[derive(Debug)]
pub struct SetStore<K, B>
where
    K: CacheKey,
{
    sets: DashMap<K, SharedSet<B>>,
}

impl<K, B> SetStore<K, B>
where
    K: CacheKey,
{
    pub fn new() -> Self {
        Self {
            sets: DashMap::new(),
        }
    }

    // == Try Get ==
    /// Returns the set for `key`, if one exists.
    ///
    /// The shard lock is released before returning; the caller takes the
    /// set's own guard to scan or mutate it.
    pub fn try_get(&self, key: &K) -> Option<SharedSet<B>> {
        self.sets.get(key).map(|set| Arc::clone(set.value()))
    }

    // == Try Create ==
    /// Stores `set` for `key` unless a set already exists.
    ///
    /// Racing creators for the same key resolve to exactly one stored set;
    /// the losers get `StoreInsertionConflict` and the existing set is left as is.
    pub fn try_create(&self, key: K, set: CacheSet<B>) -> Result<SharedSet<B>> {
        match self.sets.entry(key) {
            Entry::Occupied(occupied) => Err(CacheError::StoreInsertionConflict(format!(
                "a cache set for {:?} already exists",
                occupied.key()
            ))),
            Entry::Vacant(vacant) => {
                let shared = Arc::new(RwLock::new(set));
                vacant.insert(Arc::clone(&shared));
                Ok(shared)
            }
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.sets.contains_key(key)
    }

    /// Number of keys with a set.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl<K, B> SetStore<K, B>
where
    K: CacheKey,
    B: Clone,
{
    // == Snapshot ==
    /// Copies the blocks of `key`'s set in slot order.
    pub fn snapshot(&self, key: &K) -> Option<Vec<B>> {
        self.try_get(key).map(|set| set.read().blocks().to_vec())
    }
}

impl<K, B> Default for SetStore<K, B>
where
    K: CacheKey,
{
    fn default() -> Self {
        Self::new()
    }
}
