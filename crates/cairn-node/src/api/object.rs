//! Node-level object operations.

use std::sync::Arc;

use cn_02_block_store::BlockStore;
use cn_03_graph::{DagLink, DagNode, NodeStat, ObjectStore, ObjectTemplate};
use shared_types::ContentId;

use crate::error::Result;

#[derive(Clone)]
pub struct ObjectApi {
    objects: ObjectStore,
}

impl ObjectApi {
    pub(crate) fn new(blocks: Arc<BlockStore>) -> Self {
        Self {
            objects: ObjectStore::new(blocks),
        }
    }

    pub async fn new_object(&self, template: ObjectTemplate) -> Result<ContentId> {
        Ok(self.objects.new_object(template).await?)
    }

    pub async fn put(&self, node: &DagNode) -> Result<ContentId> {
        Ok(self.objects.put(node).await?)
    }

    pub async fn get(&self, cid: &ContentId) -> Result<DagNode> {
        Ok(self.objects.get(cid).await?)
    }

    pub async fn data(&self, cid: &ContentId) -> Result<Vec<u8>> {
        Ok(self.objects.data(cid).await?)
    }

    pub async fn links(&self, cid: &ContentId) -> Result<Vec<DagLink>> {
        Ok(self.objects.links(cid).await?)
    }

    pub async fn stat(&self, cid: &ContentId) -> Result<NodeStat> {
        Ok(self.objects.stat(cid).await?)
    }

    pub async fn patch_add_link(
        &self,
        cid: &ContentId,
        name: &str,
        target: &ContentId,
    ) -> Result<ContentId> {
        Ok(self.objects.patch_add_link(cid, name, target).await?)
    }

    pub async fn patch_rm_link(&self, cid: &ContentId, name: &str) -> Result<ContentId> {
        Ok(self.objects.patch_rm_link(cid, name).await?)
    }

    pub async fn patch_set_data(&self, cid: &ContentId, data: &[u8]) -> Result<ContentId> {
        Ok(self.objects.patch_set_data(cid, data).await?)
    }

    pub async fn patch_append_data(&self, cid: &ContentId, data: &[u8]) -> Result<ContentId> {
        Ok(self.objects.patch_append_data(cid, data).await?)
    }
}
