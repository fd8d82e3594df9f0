//! Cache Key Module
//!
//! Defines the contract a type must satisfy to address a cache set.

use std::fmt::Debug;
use std::hash::Hash;

use crate::cache::MAX_KEY_LENGTH;

// == Cache Key ==
/// A key that can address a cache set.
///
/// Keys are immutable once they address a set. `validate` is checked before
/// every lookup; a rejected key fails the retrieval with `InvalidArgument`
/// without touching the store.
pub trait CacheKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {
    /// Returns a description of why the key is unusable, if it is.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

fn validate_text(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("key must not be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    Ok(())
}

impl CacheKey for String {
    fn validate(&self) -> Result<(), String> {
        validate_text(self)
    }
}

impl CacheKey for &'static str {
    fn validate(&self) -> Result<(), String> {
        validate_text(self)
    }
}

/// `None` is the undefined key.
impl<K: CacheKey> CacheKey for Option<K> {
    fn validate(&self) -> Result<(), String> {
        match self {
            Some(key) => key.validate(),
            None => Err("key is undefined".to_string()),
        }
    }
}

macro_rules! always_valid_key {
    ($($ty:ty),* $(,)?) => {
        $(impl CacheKey for $ty {})*
    };
}

always_valid_key!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, char);
