//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;

use crate::cache::PolicyKind;
use crate::error::{CacheError, Result};

/// Cache and demo driver configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Number of slots in every key's cache set
    pub set_size: usize,
    /// Name of the built-in eviction policy
    pub eviction_policy: String,
    /// Stats reporter interval in seconds
    pub stats_interval: u64,
    /// Number of distinct keys the demo driver touches
    pub demo_keys: usize,
    /// Number of retrievals the demo driver issues
    pub demo_requests: usize,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SET_SIZE` - Slots per cache set (default: 4)
    /// - `EVICTION_POLICY` - `first`, `last` or `round_robin` (default: first)
    /// - `STATS_INTERVAL` - Stats reporting frequency in seconds (default: 5)
    /// - `DEMO_KEYS` - Distinct keys used by the demo driver (default: 16)
    /// - `DEMO_REQUESTS` - Retrievals issued by the demo driver (default: 200)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            set_size: parse_var("SET_SIZE").unwrap_or(defaults.set_size),
            eviction_policy: env::var("EVICTION_POLICY").unwrap_or(defaults.eviction_policy),
            stats_interval: parse_var("STATS_INTERVAL").unwrap_or(defaults.stats_interval),
            demo_keys: parse_var("DEMO_KEYS").unwrap_or(defaults.demo_keys),
            demo_requests: parse_var("DEMO_REQUESTS").unwrap_or(defaults.demo_requests),
        }
    }

    /// Checks that the configuration can build a cache.
    pub fn validate(&self) -> Result<()> {
        if self.set_size == 0 {
            return Err(CacheError::InvalidConfig(
                "SET_SIZE must be at least 1".to_string(),
            ));
        }
        if self.stats_interval == 0 {
            return Err(CacheError::InvalidConfig(
                "STATS_INTERVAL must be at least 1 second".to_string(),
            ));
        }
        self.policy_kind()?;
        Ok(())
    }

    /// Parses the configured eviction policy name.
    pub fn policy_kind(&self) -> Result<PolicyKind> {
        self.eviction_policy.parse()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            set_size: 4,
            eviction_policy: "first".to_string(),
            stats_interval: 5,
            demo_keys: 16,
            demo_requests: 200,
        }
    }
}
