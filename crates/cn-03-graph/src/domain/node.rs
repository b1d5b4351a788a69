//! # DAG Nodes
//!
//! A node is opaque payload bytes plus an ordered list of named links.
//! Link `size` is the cumulative size of the linked subtree, so a parent's
//! cumulative size is its own encoded size plus the sizes of its links.

use serde::{Deserialize, Serialize};
use shared_types::{Block, Codec, ContentId};

use super::errors::GraphError;

/// Named edge to another block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagLink {
    pub name: String,
    pub cid: ContentId,
    /// Cumulative size of the target subtree in bytes.
    pub size: u64,
}

impl DagLink {
    pub fn new(name: impl Into<String>, cid: ContentId, size: u64) -> Self {
        Self {
            name: name.into(),
            cid,
            size,
        }
    }
}

/// Linked-data node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagNode {
    pub data: Vec<u8>,
    pub links: Vec<DagLink>,
}

/// Size breakdown of a stored node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStat {
    pub hash: ContentId,
    pub num_links: usize,
    /// Encoded size of the node itself.
    pub block_size: usize,
    /// Encoded bytes not taken by the payload.
    pub links_size: usize,
    pub data_size: usize,
    /// Node plus everything it links to.
    pub cumulative_size: u64,
}

impl DagNode {
    pub fn new(data: impl Into<Vec<u8>>, links: Vec<DagLink>) -> Self {
        Self {
            data: data.into(),
            links,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, GraphError> {
        bincode::serialize(self).map_err(|e| GraphError::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, GraphError> {
        bincode::deserialize(bytes).map_err(|e| GraphError::Decode(e.to_string()))
    }

    /// Decode a block, rejecting anything not stored as a node.
    pub fn from_block(block: &Block) -> Result<Self, GraphError> {
        if block.cid().codec() != Codec::DagNode {
            return Err(GraphError::NotADagNode(*block.cid()));
        }
        Self::decode(block.data())
    }

    pub fn to_block(&self) -> Result<Block, GraphError> {
        Ok(Block::with_codec(Codec::DagNode, self.encode()?))
    }

    /// Link matching `segment`: by name first, then by numeric index.
    pub fn find_link(&self, segment: &str) -> Option<&DagLink> {
        self.links
            .iter()
            .find(|link| link.name == segment)
            .or_else(|| {
                segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.links.get(index))
            })
    }

    /// Add `link`, replacing any existing link with the same name.
    pub fn set_link(&mut self, link: DagLink) {
        match self.links.iter_mut().find(|l| l.name == link.name) {
            Some(existing) => *existing = link,
            None => self.links.push(link),
        }
    }

    /// Remove the link called `name`. Returns whether one was removed.
    pub fn remove_link(&mut self, name: &str) -> bool {
        let before = self.links.len();
        self.links.retain(|l| l.name != name);
        self.links.len() != before
    }

    /// Sum of link sizes.
    pub fn links_cumulative_size(&self) -> u64 {
        self.links.iter().map(|l| l.size).sum()
    }

    pub fn stat(&self) -> Result<NodeStat, GraphError> {
        let block = self.to_block()?;
        let block_size = block.len();
        Ok(NodeStat {
            hash: *block.cid(),
            num_links: self.links.len(),
            block_size,
            links_size: block_size.saturating_sub(self.data.len()),
            data_size: self.data.len(),
            cumulative_size: block_size as u64 + self.links_cumulative_size(),
        })
    }
}
