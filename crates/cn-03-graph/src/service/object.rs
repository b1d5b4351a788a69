//! # Object Operations
//!
//! Create, inspect and patch single nodes. Patches never mutate a stored
//! node; they store a modified copy and return its id.

use std::sync::Arc;

use cn_02_block_store::BlockStore;
use shared_types::{Codec, ContentId};
use tracing::debug;

use crate::domain::errors::GraphError;
use crate::domain::node::{DagLink, DagNode, NodeStat};
use crate::domain::unixfs::FileMeta;

/// Starting point for [`ObjectStore::new_object`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectTemplate {
    /// Node with no data and no links.
    #[default]
    Empty,
    /// Empty directory node.
    Directory,
}

/// Node-level operations over the block store.
#[derive(Clone)]
pub struct ObjectStore {
    blocks: Arc<BlockStore>,
}

impl ObjectStore {
    pub fn new(blocks: Arc<BlockStore>) -> Self {
        Self { blocks }
    }

    /// Store a fresh node built from `template`.
    pub async fn new_object(&self, template: ObjectTemplate) -> Result<ContentId, GraphError> {
        let node = match template {
            ObjectTemplate::Empty => DagNode::default(),
            ObjectTemplate::Directory => DagNode::new(FileMeta::directory().encode()?, Vec::new()),
        };
        self.put(&node).await
    }

    pub async fn put(&self, node: &DagNode) -> Result<ContentId, GraphError> {
        Ok(self.blocks.put(node.to_block()?).await?)
    }

    pub async fn get(&self, cid: &ContentId) -> Result<DagNode, GraphError> {
        let block = self.blocks.get(cid).await?;
        DagNode::from_block(&block)
    }

    pub async fn data(&self, cid: &ContentId) -> Result<Vec<u8>, GraphError> {
        Ok(self.get(cid).await?.data)
    }

    pub async fn links(&self, cid: &ContentId) -> Result<Vec<DagLink>, GraphError> {
        Ok(self.get(cid).await?.links)
    }

    pub async fn stat(&self, cid: &ContentId) -> Result<NodeStat, GraphError> {
        self.get(cid).await?.stat()
    }

    /// Cumulative size of whatever `cid` names, for use as a link size.
    pub async fn cumulative_size(&self, cid: &ContentId) -> Result<u64, GraphError> {
        let block = self.blocks.get(cid).await?;
        match cid.codec() {
            Codec::Raw => Ok(block.len() as u64),
            Codec::DagNode => {
                let node = DagNode::decode(block.data())?;
                Ok(block.len() as u64 + node.links_cumulative_size())
            }
        }
    }

    /// Copy of `cid` with a link `name -> target` added (or replaced).
    pub async fn patch_add_link(
        &self,
        cid: &ContentId,
        name: &str,
        target: &ContentId,
    ) -> Result<ContentId, GraphError> {
        if name.is_empty() || name.contains('/') {
            return Err(GraphError::InvalidPath(format!("bad link name {name:?}")));
        }
        let mut node = self.get(cid).await?;
        let size = self.cumulative_size(target).await?;
        node.set_link(DagLink::new(name, *target, size));
        let patched = self.put(&node).await?;
        debug!("[cn-03] add-link {} +{} -> {}", cid, name, patched);
        Ok(patched)
    }

    /// Copy of `cid` without the link called `name`.
    pub async fn patch_rm_link(&self, cid: &ContentId, name: &str) -> Result<ContentId, GraphError> {
        let mut node = self.get(cid).await?;
        if !node.remove_link(name) {
            return Err(GraphError::LinkNotFound {
                cid: *cid,
                segment: name.to_string(),
            });
        }
        self.put(&node).await
    }

    /// Copy of `cid` with its payload replaced.
    pub async fn patch_set_data(&self, cid: &ContentId, data: &[u8]) -> Result<ContentId, GraphError> {
        let mut node = self.get(cid).await?;
        node.data = data.to_vec();
        self.put(&node).await
    }

    /// Copy of `cid` with `data` appended to its payload.
    pub async fn patch_append_data(
        &self,
        cid: &ContentId,
        data: &[u8],
    ) -> Result<ContentId, GraphError> {
        let mut node = self.get(cid).await?;
        node.data.extend_from_slice(data);
        self.put(&node).await
    }
}
