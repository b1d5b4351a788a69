//! # Node Errors
//!
//! Public error taxonomy of the node. Every subsystem error converts into
//! [`NodeError`] so sub-APIs can use `?` across crate boundaries.

use std::fmt;

use cn_01_repository::RepoError;
use cn_02_block_store::BlockError;
use cn_03_graph::GraphError;
use cn_04_peers::PeerError;
use cn_05_swarm::SwarmError;
use cn_06_exchange::ExchangeError;
use shared_types::{ContentId, ParseError};
use thiserror::Error;

/// Bootstrap stage that failed during `go_online`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapStage {
    /// Swarm construction.
    Swarm,
    /// Listener startup.
    Listen,
    /// Exchange startup and hook attachment.
    Exchange,
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BootstrapStage::Swarm => "swarm",
            BootstrapStage::Listen => "listen",
            BootstrapStage::Exchange => "exchange",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("Repository is not initialized")]
    NotInitialized,

    #[error("Repository is already initialized")]
    AlreadyInitialized,

    /// Content does not hash to the identifier it was stored under.
    #[error("Content does not match {claimed} (computed {computed})")]
    IdentityMismatch {
        claimed: ContentId,
        computed: ContentId,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// A conflicting lifecycle transition is in flight.
    #[error("Node is busy: {0}")]
    Busy(String),

    /// `go_online` failed and was rolled back.
    #[error("Bootstrap failed at {stage} stage: {reason}")]
    PartialBootstrapFailure {
        stage: BootstrapStage,
        reason: String,
    },

    /// Operation needs the node online.
    #[error("Node is offline")]
    Offline,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Repository error: {0}")]
    Repository(RepoError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl NodeError {
    pub(crate) fn bootstrap(stage: BootstrapStage, reason: impl fmt::Display) -> Self {
        NodeError::PartialBootstrapFailure {
            stage,
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NodeError::NotFound(_))
    }
}

/// Convenience alias used throughout the node.
pub type Result<T> = std::result::Result<T, NodeError>;

impl From<RepoError> for NodeError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Config { message } => NodeError::Config(message),
            other => NodeError::Repository(other),
        }
    }
}

impl From<BlockError> for NodeError {
    fn from(e: BlockError) -> Self {
        match e {
            BlockError::NotFound(cid) => NodeError::NotFound(cid.to_string()),
            BlockError::IdentityMismatch { claimed, computed } => {
                NodeError::IdentityMismatch { claimed, computed }
            }
            BlockError::Timeout(cid) => NodeError::Timeout(format!("fetching {cid}")),
            BlockError::Cancelled(cid) => NodeError::Cancelled(format!("fetching {cid}")),
            BlockError::Exchange(message) => NodeError::Network(message),
            BlockError::Repository(inner) => inner.into(),
        }
    }
}

impl From<GraphError> for NodeError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::Block(inner) => inner.into(),
            GraphError::LinkNotFound { .. } | GraphError::NotTraversable { .. } => {
                NodeError::NotFound(e.to_string())
            }
            other => NodeError::InvalidInput(other.to_string()),
        }
    }
}

impl From<PeerError> for NodeError {
    fn from(e: PeerError) -> Self {
        match e {
            PeerError::IdentityCorrupt(message) => NodeError::Config(message),
            other => NodeError::InvalidInput(other.to_string()),
        }
    }
}

impl From<SwarmError> for NodeError {
    fn from(e: SwarmError) -> Self {
        match e {
            SwarmError::Timeout => NodeError::Timeout("swarm request".to_string()),
            SwarmError::Closed => NodeError::Offline,
            other => NodeError::Network(other.to_string()),
        }
    }
}

impl From<ExchangeError> for NodeError {
    fn from(e: ExchangeError) -> Self {
        match e {
            ExchangeError::Timeout => NodeError::Timeout("exchange fetch".to_string()),
            ExchangeError::Cancelled | ExchangeError::Stopped => {
                NodeError::Cancelled("exchange fetch".to_string())
            }
            ExchangeError::Block(inner) => inner.into(),
            ExchangeError::Swarm(inner) => inner.into(),
            ExchangeError::Codec(message) => NodeError::Network(message),
        }
    }
}

impl From<ParseError> for NodeError {
    fn from(e: ParseError) -> Self {
        NodeError::InvalidInput(e.to_string())
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(e: serde_json::Error) -> Self {
        NodeError::Config(e.to_string())
    }
}
