//! # Block Store Service
//!
//! Local reads go cache, then repository. Misses fall through to the
//! attached exchange, if any; fetched blocks are verified and persisted
//! before they are returned. The cache is dropped whenever the repository
//! reports a wipe.

use std::sync::{Arc, Weak};

use cn_01_repository::Repository;
use parking_lot::{Mutex, MutexGuard, RwLock};
use shared_types::{Block, ContentId};
use tracing::{debug, warn};

use crate::domain::cache::BlockCache;
use crate::domain::errors::BlockError;
use crate::domain::options::{BlockStat, GetOptions};
use crate::ports::ExchangeHook;

/// Content-addressed block store.
pub struct BlockStore {
    repo: Arc<Repository>,
    exchange: RwLock<Option<Weak<dyn ExchangeHook>>>,
    cache: Mutex<BlockCache>,
}

impl BlockStore {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self::with_cache_capacity(repo, BlockCache::DEFAULT_CAPACITY)
    }

    pub fn with_cache_capacity(repo: Arc<Repository>, capacity: usize) -> Self {
        Self {
            repo,
            exchange: RwLock::new(None),
            cache: Mutex::new(BlockCache::new(capacity)),
        }
    }

    pub fn repository(&self) -> &Arc<Repository> {
        &self.repo
    }

    // =========================================================================
    // EXCHANGE ATTACHMENT
    // =========================================================================

    /// Route local misses to `hook` until detached.
    pub fn attach_exchange(&self, hook: Weak<dyn ExchangeHook>) {
        *self.exchange.write() = Some(hook);
        debug!("[cn-02] Exchange attached");
    }

    /// Stop routing misses to the network.
    pub fn detach_exchange(&self) {
        if self.exchange.write().take().is_some() {
            debug!("[cn-02] Exchange detached");
        }
    }

    /// True while an exchange is attached and alive.
    pub fn has_exchange(&self) -> bool {
        self.exchange().is_some()
    }

    fn exchange(&self) -> Option<Arc<dyn ExchangeHook>> {
        self.exchange.read().as_ref().and_then(Weak::upgrade)
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Block for `cid`, fetched from the network if needed.
    pub async fn get(&self, cid: &ContentId) -> Result<Block, BlockError> {
        self.get_with(cid, GetOptions::default()).await
    }

    /// [`BlockStore::get`] with a timeout and/or cancellation token.
    pub async fn get_with(&self, cid: &ContentId, options: GetOptions) -> Result<Block, BlockError> {
        if let Some(block) = self.get_local(cid).await? {
            return Ok(block);
        }

        let Some(exchange) = self.exchange() else {
            return Err(BlockError::NotFound(*cid));
        };

        debug!("[cn-02] {} not held locally, asking exchange", cid);
        let fetched = exchange.fetch(cid, options).await?;

        let computed = ContentId::for_data(cid.codec(), fetched.data());
        if computed != *cid {
            warn!("[cn-02] Exchange returned wrong payload for {}", cid);
            return Err(BlockError::IdentityMismatch {
                claimed: *cid,
                computed,
            });
        }

        let block = Block::from_parts(*cid, fetched.shared_data());
        let seen = self.repo.wipe_count();
        self.repo.put_block(cid, block.data()).await?;
        self.remember(&block, seen);
        Ok(block)
    }

    /// Block for `cid` if held locally. Never touches the network.
    pub async fn get_local(&self, cid: &ContentId) -> Result<Option<Block>, BlockError> {
        if let Some(block) = self.cache().get(cid) {
            return Ok(Some(block));
        }
        let seen = self.repo.wipe_count();
        let Some(data) = self.repo.get_block(cid).await? else {
            return Ok(None);
        };
        let block = Block::from_parts(*cid, data);
        self.remember(&block, seen);
        Ok(Some(block))
    }

    /// True when `cid` is held locally.
    pub async fn has(&self, cid: &ContentId) -> Result<bool, BlockError> {
        if self.cache().get(cid).is_some() {
            return Ok(true);
        }
        Ok(self.repo.has_block(cid).await?)
    }

    /// Size of the block for `cid`, fetching it if needed.
    pub async fn stat(&self, cid: &ContentId) -> Result<BlockStat, BlockError> {
        let block = self.get(cid).await?;
        Ok(BlockStat {
            cid: *cid,
            size: block.len(),
        })
    }

    /// Ids of every locally held block.
    pub async fn list(&self) -> Result<Vec<ContentId>, BlockError> {
        Ok(self.repo.list_blocks().await?)
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Verify and store `block`, then tell the exchange about it.
    pub async fn put(&self, block: Block) -> Result<ContentId, BlockError> {
        if let Err(computed) = block.verify() {
            return Err(BlockError::IdentityMismatch {
                claimed: *block.cid(),
                computed,
            });
        }

        let cid = *block.cid();
        let seen = self.repo.wipe_count();
        self.repo.put_block(&cid, block.data()).await?;
        self.remember(&block, seen);

        if let Some(exchange) = self.exchange() {
            exchange.block_added(&block);
        }
        Ok(cid)
    }

    /// Store several blocks, stopping at the first failure.
    pub async fn put_many(
        &self,
        blocks: impl IntoIterator<Item = Block>,
    ) -> Result<Vec<ContentId>, BlockError> {
        let mut cids = Vec::new();
        for block in blocks {
            cids.push(self.put(block).await?);
        }
        Ok(cids)
    }

    /// Remove the local copy of `cid`.
    pub async fn delete(&self, cid: &ContentId) -> Result<(), BlockError> {
        self.cache().remove(cid);
        if self.repo.delete_block(cid).await? {
            Ok(())
        } else {
            Err(BlockError::NotFound(*cid))
        }
    }

    /// Drop every cached block.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache().len()
    }

    fn cache(&self) -> MutexGuard<'_, BlockCache> {
        let mut cache = self.cache.lock();
        cache.sync(self.repo.wipe_count());
        cache
    }

    /// Cache `block` unless the repository was wiped after it was read.
    fn remember(&self, block: &Block, seen: u64) {
        let mut cache = self.cache();
        if cache.wipe_count() == seen {
            cache.insert(block.clone());
        }
    }
}

#[cfg(test)]
mod tests;
