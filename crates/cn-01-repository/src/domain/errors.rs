//! # Domain Errors
//!
//! Error types for the repository subsystem.

use thiserror::Error;

/// Errors raised by the repository and its datastores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    /// Operation attempted while the repository is not open.
    #[error("Repository is closed")]
    Closed,

    /// Another process holds the repository lock.
    #[error("Repository is locked: {message}")]
    Locked { message: String },

    /// Underlying storage failed.
    #[error("Datastore I/O error: {message}")]
    Io { message: String },

    /// Key does not follow the `/segment/segment` layout.
    #[error("Invalid datastore key: {key:?}")]
    InvalidKey { key: String },

    /// A stored value could not be decoded.
    #[error("Corrupt entry at {key}: {message}")]
    Corrupt { key: String, message: String },

    /// Config document or config edit is invalid.
    #[error("Invalid config: {message}")]
    Config { message: String },

    /// Repository was written by an incompatible format version.
    #[error("Unsupported repository version {found} (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}

impl From<std::io::Error> for RepoError {
    fn from(e: std::io::Error) -> Self {
        RepoError::Io {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(e: serde_json::Error) -> Self {
        RepoError::Config {
            message: e.to_string(),
        }
    }
}
