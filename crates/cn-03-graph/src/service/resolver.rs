//! # Path Resolution
//!
//! A path is `<cid>[/segment...]`, optionally prefixed by `/ipfs/`. Each
//! segment consumes one link, so the walk is bounded by the number of
//! segments in the input.

use std::sync::Arc;

use cn_02_block_store::BlockStore;
use shared_types::{Codec, ContentId};
use tracing::trace;

use crate::domain::errors::GraphError;
use crate::domain::node::DagNode;

/// Split a path into its root id and link segments.
///
/// Empty segments (doubled or trailing slashes) are ignored.
pub fn parse_path(path: &str) -> Result<(ContentId, Vec<String>), GraphError> {
    let trimmed = path.trim();
    let body = trimmed
        .strip_prefix("/ipfs/")
        .unwrap_or_else(|| trimmed.trim_start_matches('/'));

    let mut segments = body.split('/').filter(|s| !s.is_empty());
    let root = segments
        .next()
        .ok_or_else(|| GraphError::InvalidPath(path.to_string()))?;
    let root: ContentId = root
        .parse()
        .map_err(|e| GraphError::InvalidPath(format!("{path}: {e}")))?;

    Ok((root, segments.map(str::to_string).collect()))
}

/// Walks link paths through the block store.
#[derive(Clone)]
pub struct GraphResolver {
    blocks: Arc<BlockStore>,
}

impl GraphResolver {
    pub fn new(blocks: Arc<BlockStore>) -> Self {
        Self { blocks }
    }

    /// Id of the block `path` points at.
    pub async fn resolve(&self, path: &str) -> Result<ContentId, GraphError> {
        let (root, segments) = parse_path(path)?;
        self.resolve_segments(root, segments).await
    }

    /// Follow `segments` from `root`.
    pub async fn resolve_segments(
        &self,
        root: ContentId,
        segments: Vec<String>,
    ) -> Result<ContentId, GraphError> {
        let mut current = root;
        for segment in segments {
            if current.codec() == Codec::Raw {
                return Err(GraphError::NotTraversable {
                    cid: current,
                    segment,
                });
            }
            let block = self.blocks.get(&current).await?;
            let node = DagNode::from_block(&block)?;
            let next = node
                .find_link(&segment)
                .map(|link| link.cid)
                .ok_or_else(|| GraphError::LinkNotFound {
                    cid: current,
                    segment: segment.clone(),
                })?;
            trace!("[cn-03] {} /{} -> {}", current, segment, next);
            current = next;
        }
        Ok(current)
    }
}
