//! Eviction Policy Module
//!
//! Chooses which slot of a full cache set gets overwritten.
//!
//! The cache hands a policy no context: no key, no set contents, no access
//! history. A policy that wants recency semantics keeps its own state and the
//! caller correlates it with the keys it passes to the cache.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{CacheError, Result};

// == Eviction Policy ==
/// Strategy that picks the slot to overwrite when a set is full.
///
/// Called only while the set is observed full, under the set's write guard.
/// The returned index must lie in `[0, set_size)`; anything else fails the
/// retrieval with `InvalidEvictionIndex` and leaves the set unmodified.
pub trait EvictionPolicy: Send + Sync {
    fn choose_index(&self) -> i64;
}

impl<F> EvictionPolicy for F
where
    F: Fn() -> i64 + Send + Sync,
{
    fn choose_index(&self) -> i64 {
        self()
    }
}

// == Resolve Index ==
/// Checks a policy's raw answer against the set size.
pub fn resolve_index(raw: i64, set_size: usize) -> Result<usize> {
    match usize::try_from(raw) {
        Ok(slot) if slot < set_size => Ok(slot),
        _ => Err(CacheError::InvalidEvictionIndex {
            index: raw,
            set_size,
        }),
    }
}

// == Built-in Policies ==
/// Always overwrites slot 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstSlot;

impl EvictionPolicy for FirstSlot {
    fn choose_index(&self) -> i64 {
        0
    }
}

/// Always overwrites the last slot of the set.
#[derive(Debug, Clone, Copy)]
pub struct LastSlot {
    set_size: usize,
}

impl LastSlot {
    pub fn new(set_size: usize) -> Self {
        Self { set_size }
    }
}

impl EvictionPolicy for LastSlot {
    fn choose_index(&self) -> i64 {
        self.set_size as i64 - 1
    }
}

/// Cycles through every slot in order, shared across all keys.
#[derive(Debug)]
pub struct RoundRobin {
    set_size: usize,
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new(set_size: usize) -> Self {
        Self {
            set_size,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl EvictionPolicy for RoundRobin {
    fn choose_index(&self) -> i64 {
        let next = self.cursor.fetch_add(1, Ordering::Relaxed);
        (next % self.set_size.max(1)) as i64
    }
}

// == Policy Kind ==
/// Named built-in policy, as selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    First,
    Last,
    RoundRobin,
}

impl PolicyKind {
    /// Builds the policy for sets of `set_size` slots.
    pub fn build(self, set_size: usize) -> Box<dyn EvictionPolicy> {
        match self {
            PolicyKind::First => Box::new(FirstSlot),
            PolicyKind::Last => Box::new(LastSlot::new(set_size)),
            PolicyKind::RoundRobin => Box::new(RoundRobin::new(set_size)),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(PolicyKind::First),
            "last" => Ok(PolicyKind::Last),
            "round_robin" | "round-robin" => Ok(PolicyKind::RoundRobin),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown eviction policy '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyKind::First => "first",
            PolicyKind::Last => "last",
            PolicyKind::RoundRobin => "round_robin",
        };
        f.write_str(name)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_index_in_range() {
        assert_eq!(resolve_index(0, 3).unwrap(), 0);
        assert_eq!(resolve_index(2, 3).unwrap(), 2);
    }

    #[test]
    fn test_resolve_index_out_of_range() {
        assert!(matches!(
            resolve_index(3, 3),
            Err(CacheError::InvalidEvictionIndex {
                index: 3,
                set_size: 3
            })
        ));
        assert!(matches!(
            resolve_index(-1, 3),
            Err(CacheError::InvalidEvictionIndex {
                index: -1,
                set_size: 3
            })
        ));
    }

    #[test]
    fn test_fixed_policies() {
        assert_eq!(FirstSlot.choose_index(), 0);
        assert_eq!(LastSlot::new(4).choose_index(), 3);
    }

    #[test]
    fn test_round_robin_cycles() {
        let policy = RoundRobin::new(3);
        let picks: Vec<i64> = (0..7).map(|_| policy.choose_index()).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_closure_policy() {
        let policy = || 2i64;
        assert_eq!(policy.choose_index(), 2);

        let boxed: Box<dyn EvictionPolicy> = Box::new(|| -5i64);
        assert_eq!(boxed.choose_index(), -5);
    }

    #[test]
    fn test_policy_kind_parse() {
        assert_eq!("first".parse::<PolicyKind>().unwrap(), PolicyKind::First);
        assert_eq!(" LAST ".parse::<PolicyKind>().unwrap(), PolicyKind::Last);
        assert_eq!(
            "round-robin".parse::<PolicyKind>().unwrap(),
            PolicyKind::RoundRobin
        );
        assert!(matches!(
            "lru".parse::<PolicyKind>(),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_policy_kind_build() {
        assert_eq!(PolicyKind::Last.build(5).choose_index(), 4);
        assert_eq!(PolicyKind::First.to_string(), "first");
    }
}
