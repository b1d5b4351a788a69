//! Exchange errors.

use cn_02_block_store::BlockError;
use cn_05_swarm::SwarmError;
use shared_types::ContentId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("Fetch timed out")]
    Timeout,

    /// Caller cancelled or the want was dropped.
    #[error("Fetch cancelled")]
    Cancelled,

    #[error("Exchange is stopped")]
    Stopped,

    #[error("Malformed exchange message: {0}")]
    Codec(String),

    #[error("Swarm error: {0}")]
    Swarm(#[from] SwarmError),

    #[error("Block store error: {0}")]
    Block(#[from] BlockError),
}

impl ExchangeError {
    /// Block store view of a failed fetch of `cid`.
    pub fn into_block_error(self, cid: ContentId) -> BlockError {
        match self {
            ExchangeError::Timeout => BlockError::Timeout(cid),
            ExchangeError::Cancelled | ExchangeError::Stopped => BlockError::Cancelled(cid),
            ExchangeError::Block(inner) => inner,
            other => BlockError::Exchange(other.to_string()),
        }
    }
}
