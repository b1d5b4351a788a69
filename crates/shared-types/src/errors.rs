//! # Error Types
//!
//! Parse errors for the textual forms of shared entities.

use thiserror::Error;

/// Errors raised while decoding identifiers and addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Content identifier text or bytes are malformed.
    #[error("Invalid content identifier: {0}")]
    InvalidContentId(String),

    /// Codec byte is not one this node understands.
    #[error("Unsupported codec: 0x{0:02x}")]
    UnsupportedCodec(u8),

    /// Peer id text is malformed.
    #[error("Invalid peer id: {0}")]
    InvalidPeerId(String),

    /// Peer address text is malformed.
    #[error("Invalid peer address: {0}")]
    InvalidPeerAddr(String),
}
