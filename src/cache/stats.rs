//! Cache Statistics Module
//!
//! Tracks retrieval outcomes: hits, misses, refills and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time view of cache counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Retrievals that found a set for the key
    pub hits: u64,
    /// Retrievals that found no set for the key
    pub misses: u64,
    /// Hits answered by a block that passed the tag check
    pub valid_hits: u64,
    /// Hits where no block passed the tag check
    pub tag_mismatches: u64,
    /// Refills that grew a set by one slot
    pub appends: u64,
    /// Refills that overwrote a slot chosen by the eviction policy
    pub evictions: u64,
    /// Fallback invocations
    pub fallback_calls: u64,
    /// Fallback invocations that failed
    pub fallback_failures: u64,
    /// Miss-path creates that found the key already stored
    pub insert_conflicts: u64,
    /// Misses that waited on another caller's refill instead of invoking a fallback
    pub coalesced_waits: u64,
    /// Number of keys with a cache set
    pub total_keys: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Lock-free counters updated by concurrent retrievals.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    valid_hits: AtomicU64,
    tag_mismatches: AtomicU64,
    appends: AtomicU64,
    evictions: AtomicU64,
    fallback_calls: AtomicU64,
    fallback_failures: AtomicU64,
    insert_conflicts: AtomicU64,
    coalesced_waits: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_valid_hit(&self) {
        self.valid_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tag_mismatch(&self) {
        self.tag_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_append(&self) {
        self.appends.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback_call(&self) {
        self.fallback_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback_failure(&self) {
        self.fallback_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insert_conflict(&self) {
        self.insert_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coalesced_wait(&self) {
        self.coalesced_waits.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Reads every counter into a [`CacheStats`].
    pub fn snapshot(&self, total_keys: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            valid_hits: self.valid_hits.load(Ordering::Relaxed),
            tag_mismatches: self.tag_mismatches.load(Ordering::Relaxed),
            appends: self.appends.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            fallback_calls: self.fallback_calls.load(Ordering::Relaxed),
            fallback_failures: self.fallback_failures.load(Ordering::Relaxed),
            insert_conflicts: self.insert_conflicts.load(Ordering::Relaxed),
            coalesced_waits: self.coalesced_waits.load(Ordering::Relaxed),
            total_keys,
        }
    }
}
