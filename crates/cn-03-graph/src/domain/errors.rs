//! Graph errors.

use cn_02_block_store::BlockError;
use shared_types::ContentId;
use thiserror::Error;

/// Errors raised while decoding, resolving or laying out nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A path segment matched no link.
    #[error("No link named {segment:?} under {cid}")]
    LinkNotFound { cid: ContentId, segment: String },

    /// Path walked into a raw block with segments left.
    #[error("Cannot traverse into raw block {cid} (remaining {segment:?})")]
    NotTraversable { cid: ContentId, segment: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Block {0} is not a linked-data node")]
    NotADagNode(ContentId),

    /// Node payload is malformed.
    #[error("Failed to decode node: {0}")]
    Decode(String),

    #[error("Failed to encode node: {0}")]
    Encode(String),

    /// Node is not part of a file/directory layout.
    #[error("{0} is not a file or directory node")]
    NotUnixfs(ContentId),

    #[error("{0} is a directory")]
    IsDirectory(String),

    #[error("Block store error: {0}")]
    Block(#[from] BlockError),
}

impl GraphError {
    /// True when the error means "nothing lives at that path".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GraphError::LinkNotFound { .. }
                | GraphError::NotTraversable { .. }
                | GraphError::Block(BlockError::NotFound(_))
        )
    }
}
