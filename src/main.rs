//! Assoc Cache demo driver
//!
//! Runs a concurrent workload against a set-associative cache backed by a
//! simulated slow, versioned data source, then prints the final statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dashmap::DashMap;
use tokio::signal;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assoc_cache::{spawn_stats_reporter, CacheConfig, SetAssociativeCache};

/// Simulated upstream latency per fallback.
const SOURCE_LATENCY: Duration = Duration::from_millis(5);

/// Every Nth request publishes a new version of its key upstream.
const UPDATE_EVERY: usize = 7;

/// A block as cached by the demo: one version of one upstream record.
#[derive(Debug, Clone)]
struct Record {
    id: u64,
    version: u64,
    payload: String,
}

/// Upstream store whose records change version over time.
#[derive(Debug, Default)]
struct VersionedSource {
    versions: DashMap<u64, AtomicU64>,
}

impl VersionedSource {
    fn current(&self, id: u64) -> u64 {
        self.versions
            .get(&id)
            .map(|v| v.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    fn publish(&self, id: u64) {
        self.versions
            .entry(id)
            .or_default()
            .fetch_add(1, Ordering::AcqRel);
    }

    async fn fetch(&self, id: u64) -> Record {
        tokio::time::sleep(SOURCE_LATENCY).await;
        let version = self.current(id);
        Record {
            id,
            version,
            payload: format!("record-{}-v{}", id, version),
        }
    }
}

/// Main entry point for the demo driver.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create the cache with the configured set size and policy
/// 4. Start the background stats reporter
/// 5. Run the workload, stopping early on Ctrl+C
/// 6. Print final statistics as JSON
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assoc_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Assoc Cache demo");

    let config = CacheConfig::from_env();
    config.validate().context("invalid configuration")?;
    info!(
        "Configuration loaded: set_size={}, eviction_policy={}, keys={}, requests={}",
        config.set_size, config.eviction_policy, config.demo_keys, config.demo_requests
    );

    let cache = Arc::new(
        SetAssociativeCache::<u64, Record>::from_config(&config)
            .context("failed to build cache")?,
    );
    let source = Arc::new(VersionedSource::default());

    let reporter = spawn_stats_reporter(cache.clone(), config.stats_interval);
    info!("Stats reporter started");

    tokio::select! {
        result = run_workload(cache.clone(), source, &config) => {
            result?;
        }
        _ = signal::ctrl_c() => {
            warn!("Received Ctrl+C, stopping workload");
        }
    }

    reporter.abort();

    let stats = serde_json::to_string_pretty(&cache.stats()).context("failed to encode stats")?;
    println!("{}", stats);

    info!("Demo complete");
    Ok(())
}

/// Issues `demo_requests` concurrent retrievals spread over `demo_keys` keys.
async fn run_workload(
    cache: Arc<SetAssociativeCache<u64, Record>>,
    source: Arc<VersionedSource>,
    config: &CacheConfig,
) -> anyhow::Result<()> {
    let keys = config.demo_keys.max(1) as u64;
    let mut tasks = JoinSet::new();

    for request in 0..config.demo_requests {
        let id = request as u64 % keys;
        if request > 0 && request % UPDATE_EVERY == 0 {
            source.publish(id);
        }

        let cache = cache.clone();
        let source = source.clone();
        tasks.spawn(async move {
            let wanted = source.current(id);
            let fetch_from = source.clone();
            cache
                .get(
                    id,
                    move |record: &Record| record.version >= wanted,
                    move || async move { Ok::<_, std::convert::Infallible>(fetch_from.fetch(id).await) },
                )
                .await
        });
    }

    let mut served = 0usize;
    while let Some(joined) = tasks.join_next().await {
        let record = joined.context("retrieval task panicked")??;
        tracing::debug!("Served {} ({})", record.id, record.payload);
        served += 1;
    }

    info!("Workload finished: {} retrievals served", served);
    Ok(())
}
