//! Stats Reporter Task
//!
//! Background task that periodically logs cache statistics.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheKey, SetAssociativeCache};

/// Spawns a background task that periodically logs a stats snapshot.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between reports. Intervals with no retrieval activity are only logged at
/// debug level.
///
/// # Arguments
/// * `cache` - shared reference to the cache
/// * `interval_secs` - Interval in seconds between reports
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(SetAssociativeCache::<u64, String>::new(4, FirstSlot)?);
/// let reporter = spawn_stats_reporter(cache.clone(), 5);
/// // Later, during shutdown:
/// reporter.abort();
/// ```
pub fn spawn_stats_reporter<K, B>(
    cache: Arc<SetAssociativeCache<K, B>>,
    interval_secs: u64,
) -> JoinHandle<()>
where
    K: CacheKey,
    B: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting stats reporter with interval of {} seconds",
            interval_secs
        );

        let mut last_requests = 0;

        loop {
            tokio::time::sleep(interval).await;

            let stats = cache.stats();
            let requests = stats.hits + stats.misses;

            if requests > last_requests {
                info!(
                    "Cache stats: keys={}, hits={}, misses={}, tag_mismatches={}, evictions={}, fallback_failures={}, hit_rate={:.2}",
                    stats.total_keys,
                    stats.hits,
                    stats.misses,
                    stats.tag_mismatches,
                    stats.evictions,
                    stats.fallback_failures,
                    stats.hit_rate()
                );
            } else {
                debug!("Cache stats: no retrievals since last report");
            }

            last_requests = requests;
        }
    })
}
