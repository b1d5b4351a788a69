//! Raw block access.

use std::sync::Arc;

use cn_02_block_store::{BlockStat, BlockStore, GetOptions};
use shared_types::{Block, Codec, ContentId};

use crate::error::Result;

#[derive(Clone)]
pub struct BlockApi {
    blocks: Arc<BlockStore>,
}

impl BlockApi {
    pub(crate) fn new(blocks: Arc<BlockStore>) -> Self {
        Self { blocks }
    }

    /// Local block, or a network fetch while online.
    pub async fn get(&self, cid: &ContentId) -> Result<Block> {
        Ok(self.blocks.get(cid).await?)
    }

    /// Like [`get`](Self::get) with a caller timeout and cancellation token.
    pub async fn get_with(&self, cid: &ContentId, options: GetOptions) -> Result<Block> {
        Ok(self.blocks.get_with(cid, options).await?)
    }

    /// Store a block after checking its payload against its id.
    pub async fn put(&self, block: Block) -> Result<ContentId> {
        Ok(self.blocks.put(block).await?)
    }

    /// Store `data` as a raw block.
    pub async fn put_data(&self, data: impl Into<Vec<u8>>) -> Result<ContentId> {
        self.put(Block::with_codec(Codec::Raw, data)).await
    }

    pub async fn rm(&self, cid: &ContentId) -> Result<()> {
        Ok(self.blocks.delete(cid).await?)
    }

    pub async fn stat(&self, cid: &ContentId) -> Result<BlockStat> {
        Ok(self.blocks.stat(cid).await?)
    }
}
