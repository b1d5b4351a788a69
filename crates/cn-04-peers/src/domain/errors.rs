//! Peer errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeerError {
    /// Requested key size cannot seed a key.
    #[error("Invalid key size {bits}: must be a multiple of 8 between {min} and {max}")]
    InvalidKeySize { bits: u32, min: u32, max: u32 },

    /// Stored identity does not hold together.
    #[error("Stored identity is corrupt: {0}")]
    IdentityCorrupt(String),

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Signature verification failed")]
    BadSignature,
}
