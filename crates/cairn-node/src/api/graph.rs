//! Path resolution.

use std::sync::Arc;

use cn_02_block_store::BlockStore;
use cn_03_graph::GraphResolver;
use shared_types::ContentId;

use crate::error::Result;

#[derive(Clone)]
pub struct GraphApi {
    resolver: GraphResolver,
}

impl GraphApi {
    pub(crate) fn new(blocks: Arc<BlockStore>) -> Self {
        Self {
            resolver: GraphResolver::new(blocks),
        }
    }

    /// Id named by `<cid>[/segment...]`, with an optional `/ipfs/` prefix.
    pub async fn resolve(&self, path: &str) -> Result<ContentId> {
        Ok(self.resolver.resolve(path).await?)
    }
}
