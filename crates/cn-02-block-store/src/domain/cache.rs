//! Bounded in-memory block cache with first-in first-out eviction.

use std::collections::{HashMap, VecDeque};

use shared_types::{Block, ContentId};

/// Holds recently stored or loaded blocks.
///
/// Blocks share their payload with callers, so a hit costs a refcount bump.
/// Entries are tagged with the repository wipe count they were read under.
#[derive(Debug)]
pub struct BlockCache {
    capacity: usize,
    entries: HashMap<ContentId, Block>,
    order: VecDeque<ContentId>,
    wipe_count: u64,
}

impl BlockCache {
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Cache holding at most `capacity` blocks. Zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
            wipe_count: 0,
        }
    }

    /// Drop everything if the repository has been wiped since the entries
    /// were read.
    pub fn sync(&mut self, wipe_count: u64) {
        if wipe_count != self.wipe_count {
            self.clear();
            self.wipe_count = wipe_count;
        }
    }

    pub fn wipe_count(&self) -> u64 {
        self.wipe_count
    }

    pub fn get(&self, cid: &ContentId) -> Option<Block> {
        self.entries.get(cid).cloned()
    }

    pub fn insert(&mut self, block: Block) {
        if self.capacity == 0 || self.entries.contains_key(block.cid()) {
            return;
        }
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(*block.cid());
        self.entries.insert(*block.cid(), block);
    }

    pub fn remove(&mut self, cid: &ContentId) {
        if self.entries.remove(cid).is_some() {
            self.order.retain(|c| c != cid);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BlockCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
