//! In-Flight Registry Module
//!
//! Coalesces concurrent misses for the same absent key so that only one of
//! them runs its fallback while the others wait for it to finish.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;

use crate::cache::CacheKey;

// == In-Flight Registry ==
/// Per-key registry of miss-path refills currently running.
///
/// The leader keeps the sending half of a watch channel. Followers hold
/// receivers; the channel closing when the leader's guard drops is the
/// completion signal, so a failed or cancelled leader releases followers too.
#[derive(Debug)]
pub(crate) struct InFlight<K>
where
    K: CacheKey,
{
    pending: Arc<DashMap<K, watch::Receiver<()>>>,
}

/// Outcome of registering a miss.
#[derive(Debug)]
pub(crate) enum Flight<K>
where
    K: CacheKey,
{
    /// This caller runs the fallback for the key.
    Leader(LeaderGuard<K>),
    /// Another caller is already refilling the key.
    Follower(Waiter),
}

impl<K> InFlight<K>
where
    K: CacheKey,
{
    pub fn new() -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
        }
    }

    // == Join Or Lead ==
    /// Becomes the leader for `key`, or joins the refill already running.
    pub fn join_or_lead(&self, key: &K) -> Flight<K> {
        match self.pending.entry(key.clone()) {
            Entry::Occupied(occupied) => Flight::Follower(Waiter {
                done: occupied.get().clone(),
            }),
            Entry::Vacant(vacant) => {
                let (tx, rx) = watch::channel(());
                vacant.insert(rx);
                Flight::Leader(LeaderGuard {
                    key: Some(key.clone()),
                    pending: Arc::clone(&self.pending),
                    _done: tx,
                })
            }
        }
    }

    /// Number of keys with a refill in progress.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<K> Default for InFlight<K>
where
    K: CacheKey,
{
    fn default() -> Self {
        Self::new()
    }
}

// == Leader Guard ==
/// Held by the caller running the fallback for a key.
///
/// Dropping it unregisters the key and then closes the channel, waking every
/// follower.
#[derive(Debug)]
pub(crate) struct LeaderGuard<K>
where
    K: CacheKey,
{
    key: Option<K>,
    pending: Arc<DashMap<K, watch::Receiver<()>>>,
    _done: watch::Sender<()>,
}

impl<K> Drop for LeaderGuard<K>
where
    K: CacheKey,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.pending.remove(&key);
        }
    }
}

// == Waiter ==
/// Held by a caller waiting on another caller's refill.
#[derive(Debug)]
pub(crate) struct Waiter {
    done: watch::Receiver<()>,
}

impl Waiter {
    /// Resolves once the leader's guard has been dropped.
    pub async fn wait(mut self) {
        // The leader never sends; `changed` errors once the sender is gone.
        while self.done.changed().await.is_ok() {}
    }
}
