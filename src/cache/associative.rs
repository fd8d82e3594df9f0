//! Set-Associative Cache Module
//!
//! Retrieval engine combining the set store, per-key guards, the single-flight
//! miss registry, the eviction policy and the caller's fallback.

use std::future::Future;

use tracing::{debug, info, warn};

use crate::cache::fallback::{invoke, BoxError};
use crate::cache::policy::resolve_index;
use crate::cache::store::SharedSet;
use crate::cache::inflight::{Flight, InFlight};
use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheKey, CacheSet, CacheStats, EvictionPolicy, SetStore};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Set-Associative Cache ==
/// Generic key-to-set cache with caller-driven tag checks and async refill.
///
/// Each key owns up to `set_size` blocks. A retrieval returns the first block
/// the caller's predicate accepts; otherwise the caller's fallback produces a
/// fresh block, which is appended to the set or overwrites the slot chosen by
/// the eviction policy once the set is full.
pub struct SetAssociativeCache<K, B>
where
    K: CacheKey,
{
    /// Key to guarded cache set
    store: SetStore<K, B>,
    /// Misses currently running a fallback
    inflight: InFlight<K>,
    /// Slot chooser for full sets
    policy: Box<dyn EvictionPolicy>,
    /// Slots per set
    set_size: usize,
    /// Retrieval counters
    stats: StatsRecorder,
}

impl<K, B> SetAssociativeCache<K, B>
where
    K: CacheKey,
    B: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates an empty cache with `set_size` slots per key.
    ///
    /// # Arguments
    /// * `set_size` - Slots per cache set, at least 1
    /// * `policy` - Slot chooser consulted when a set is full
    pub fn new(set_size: usize, policy: impl EvictionPolicy + 'static) -> Result<Self> {
        Self::with_boxed_policy(set_size, Box::new(policy))
    }

    /// Creates an empty cache around an already boxed policy.
    pub fn with_boxed_policy(set_size: usize, policy: Box<dyn EvictionPolicy>) -> Result<Self> {
        if set_size == 0 {
            return Err(CacheError::InvalidArgument(
                "set size must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            store: SetStore::new(),
            inflight: InFlight::new(),
            policy,
            set_size,
            stats: StatsRecorder::new(),
        })
    }

    /// Creates a cache using the configured set size and built-in policy.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let kind = config.policy_kind()?;
        info!(
            "Building cache: set_size={}, eviction_policy={}",
            config.set_size, kind
        );
        Self::with_boxed_policy(config.set_size, kind.build(config.set_size))
    }

    // == Get ==
    /// Returns a block for `key` that passes `is_valid`, refilling through
    /// `fallback` when none does.
    ///
    /// - Hit with a valid block: the first valid block in slot order is
    ///   returned and `fallback` is never called.
    /// - Hit without a valid block: `fallback` runs outside any guard, then
    ///   the new block is appended, or written over the policy's slot if the
    ///   set is full. Deciding and writing happen under one write guard.
    /// - Miss: concurrent misses for the same key are coalesced. One caller
    ///   runs its fallback and stores a single-block set; the others wait and
    ///   retry the lookup.
    ///
    /// # Errors
    /// * `InvalidArgument` - the key failed validation; nothing was touched
    /// * `FallbackFailed` - the fallback errored or panicked; nothing was stored
    ///
    /// Dropping the returned future aborts a running fallback and, on the
    /// miss path, wakes the callers waiting on it.
    /// * `InvalidEvictionIndex` - the policy chose a slot outside the set;
    ///   the set is unchanged
    pub async fn get<V, F, Fut, E>(&self, key: K, is_valid: V, fallback: F) -> Result<B>
    where
        V: Fn(&B) -> bool + Send,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<B, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        key.validate().map_err(CacheError::InvalidArgument)?;

        let mut fallback = Some(fallback);

        loop {
            if let Some(set) = self.store.try_get(&key) {
                self.stats.record_hit();

                if let Some(block) = Self::scan(&set, &is_valid) {
                    self.stats.record_valid_hit();
                    return Ok(block);
                }

                self.stats.record_tag_mismatch();
                debug!("No valid block for {:?}, refilling", key);
                let block = self.produce(&mut fallback).await?;
                return self.refill(&key, &set, block);
            }

            match self.inflight.join_or_lead(&key) {
                Flight::Follower(waiter) => {
                    self.stats.record_coalesced_wait();
                    debug!("Waiting on in-flight refill for {:?}", key);
                    waiter.wait().await;
                }
                Flight::Leader(guard) => {
                    // A previous leader may have stored the set after our lookup.
                    if self.store.contains(&key) {
                        drop(guard);
                        continue;
                    }

                    self.stats.record_miss();
                    debug!("Cache miss for {:?}", key);
                    let block = self.produce(&mut fallback).await?;
                    self.create(key, block.clone());
                    drop(guard);
                    return Ok(block);
                }
            }
        }
    }

    // == Scan ==
    /// Copies out the first valid block under a read guard.
    fn scan<V>(set: &SharedSet<B>, is_valid: &V) -> Option<B>
    where
        V: Fn(&B) -> bool,
    {
        let guard = set.read();
        guard.find(is_valid).cloned()
    }

    // == Produce ==
    async fn produce<F, Fut, E>(&self, fallback: &mut Option<F>) -> Result<B>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<B, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let fallback = fallback
            .take()
            .ok_or_else(|| CacheError::InvalidArgument("fallback is undefined".to_string()))?;

        self.stats.record_fallback_call();
        match invoke(fallback).await {
            Ok(block) => Ok(block),
            Err(err) => {
                self.stats.record_fallback_failure();
                Err(err)
            }
        }
    }

    // == Refill ==
    /// Writes a freshly produced block into an existing set.
    ///
    /// The fullness check, the policy call and the write share one write
    /// guard, so concurrent refills can neither overflow the set nor
    /// interleave between choosing and writing a slot.
    fn refill(&self, key: &K, set: &SharedSet<B>, block: B) -> Result<B> {
        let mut guard = set.write();

        if guard.is_full() {
            let raw = self.policy.choose_index();
            let slot = resolve_index(raw, self.set_size).map_err(|err| {
                warn!("Eviction policy contract violated for {:?}: {}", key, err);
                err
            })?;
            guard.replace(slot, block.clone())?;
            self.stats.record_eviction();
            debug!("Evicted slot {} of {:?}", slot, key);
        } else {
            let slot = guard.append(block.clone());
            self.stats.record_append();
            debug!("Appended slot {} to {:?}", slot, key);
        }

        Ok(block)
    }

    // == Create ==
    /// Stores a single-block set for a missed key.
    ///
    /// Losing a create race is not an error for the retrieval: its caller
    /// still receives the block it produced, but the stored set is the winner's.
    fn create(&self, key: K, block: B) {
        match self.store.try_create(key, CacheSet::singleton(self.set_size, block)) {
            Ok(_) => {}
            Err(conflict) => {
                self.stats.record_insert_conflict();
                debug!("Keeping existing set: {}", conflict);
            }
        }
    }

    // == Introspection ==
    /// Slots per cache set.
    pub fn set_size(&self) -> usize {
        self.set_size
    }

    /// Number of keys with a cache set.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.store.contains(key)
    }

    /// Copies the blocks currently held for `key`, in slot order.
    pub fn snapshot(&self, key: &K) -> Option<Vec<B>> {
        self.store.snapshot(key)
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.store.len())
    }
}
