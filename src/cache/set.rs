//! Cache Set Module
//!
//! Defines the bounded, ordered group of blocks held for one key.

use crate::error::{CacheError, Result};

// == Cache Set ==
/// Ordered, capacity-bounded sequence of blocks for one key.
///
/// Slot indices are stable: reads never reorder the set, appends go to the
/// end, and a replacement swaps a whole block at an existing slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSet<B> {
    /// Blocks in slot order
    blocks: Vec<B>,
    /// Fixed number of slots
    capacity: usize,
}

impl<B> CacheSet<B> {
    // == Constructors ==
    /// Creates an empty set with room for `capacity` blocks.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            blocks: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Creates a set holding exactly one block, as built on a miss.
    pub fn singleton(capacity: usize, block: B) -> Self {
        let mut set = Self::with_capacity(capacity);
        set.blocks.push(block);
        set
    }

    // == Find ==
    /// Returns the first block, in slot order, accepted by `pred`.
    pub fn find<P>(&self, pred: P) -> Option<&B>
    where
        P: Fn(&B) -> bool,
    {
        self.blocks.iter().find(|&block| pred(block))
    }

    // == Append ==
    /// Appends a block to a new slot and returns that slot.
    ///
    /// Callers must route inserts into a full set through [`CacheSet::replace`].
    pub fn append(&mut self, block: B) -> usize {
        debug_assert!(!self.is_full(), "append on a full cache set");
        self.blocks.push(block);
        self.blocks.len() - 1
    }

    // == Replace ==
    /// Overwrites the block at `slot` and returns the evicted block.
    pub fn replace(&mut self, slot: usize, block: B) -> Result<B> {
        match self.blocks.get_mut(slot) {
            Some(current) => Ok(std::mem::replace(current, block)),
            None => Err(CacheError::InvalidEvictionIndex {
                index: slot as i64,
                set_size: self.capacity,
            }),
        }
    }

    /// Blocks in slot order.
    pub fn blocks(&self) -> &[B] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once every slot is occupied and inserts must evict.
    pub fn is_full(&self) -> bool {
        self.blocks.len() >= self.capacity
    }
}
