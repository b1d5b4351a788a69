//! # Ports
//!
//! [`ExchangeHook`] is implemented by the block exchange and attached to
//! the store while the node is online.

use async_trait::async_trait;
use shared_types::{Block, ContentId};

use crate::domain::errors::BlockError;
use crate::domain::options::GetOptions;

/// Network fallback for blocks not held locally.
#[async_trait]
pub trait ExchangeHook: Send + Sync {
    /// Fetch `cid` from peers. The returned block is verified by the store
    /// before it is persisted.
    async fn fetch(&self, cid: &ContentId, options: GetOptions) -> Result<Block, BlockError>;

    /// A block became available locally; pending wants can resolve.
    fn block_added(&self, block: &Block);
}
