//! Swarm errors.

use shared_types::{PeerAddr, PeerId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwarmError {
    #[error("Swarm is closed")]
    Closed,

    #[error("Unsupported transport in {0}")]
    UnsupportedTransport(PeerAddr),

    #[error("Address already in use: {0}")]
    AddressInUse(PeerAddr),

    #[error("Failed to listen on {addr}: {reason}")]
    ListenFailed { addr: PeerAddr, reason: String },

    #[error("Failed to dial {addr}: {reason}")]
    DialFailed { addr: PeerAddr, reason: String },

    /// Remote answered with a different identity than the address named.
    #[error("Dialed {expected:?} but reached {actual:?}")]
    PeerMismatch { expected: PeerId, actual: PeerId },

    #[error("Not connected to {0:?}")]
    NotConnected(PeerId),

    #[error("Connection limit of {0} reached")]
    ConnectionLimit(usize),

    #[error("Protocol {0} is not supported by the remote")]
    UnknownProtocol(String),

    #[error("Protocol {0} is already registered")]
    ProtocolInUse(String),

    #[error("Request timed out")]
    Timeout,

    /// Remote handler failed.
    #[error("Remote error: {0}")]
    Remote(String),

    /// Transport could not build a swarm.
    #[error("Transport error: {0}")]
    Transport(String),
}
