//! # File and Directory Metadata
//!
//! Nodes produced by [`FileLayout`](crate::FileLayout) carry a tagged
//! [`FileMeta`] as their payload. The tag keeps arbitrary object payloads
//! from being mistaken for file metadata.

use serde::{Deserialize, Serialize};

use super::errors::GraphError;

const TAG: &[u8; 4] = b"cfs1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Directory,
}

/// Payload of a file or directory node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub kind: NodeKind,
    /// Total content bytes below this node (files only).
    pub filesize: u64,
    /// Content bytes under each link, in link order (files only).
    pub blocksizes: Vec<u64>,
}

impl FileMeta {
    pub fn file(blocksizes: Vec<u64>) -> Self {
        Self {
            kind: NodeKind::File,
            filesize: blocksizes.iter().sum(),
            blocksizes,
        }
    }

    pub fn directory() -> Self {
        Self {
            kind: NodeKind::Directory,
            filesize: 0,
            blocksizes: Vec::new(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, GraphError> {
        let mut out = TAG.to_vec();
        bincode::serialize_into(&mut out, self).map_err(|e| GraphError::Encode(e.to_string()))?;
        Ok(out)
    }

    /// Decode node payload. `None` when it is not file metadata at all.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let body = bytes.strip_prefix(TAG.as_slice())?;
        bincode::deserialize(body).ok()
    }
}
