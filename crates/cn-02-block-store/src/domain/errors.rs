//! Block store errors.

use cn_01_repository::RepoError;
use shared_types::ContentId;
use thiserror::Error;

/// Errors raised by block store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    /// Not held locally and no exchange could supply it.
    #[error("Block not found: {0}")]
    NotFound(ContentId),

    /// Payload does not hash to the claimed id.
    #[error("Block identity mismatch: claimed {claimed}, computed {computed}")]
    IdentityMismatch {
        claimed: ContentId,
        computed: ContentId,
    },

    /// Network fetch did not complete in time.
    #[error("Timed out fetching {0}")]
    Timeout(ContentId),

    /// Network fetch was cancelled by the caller or by shutdown.
    #[error("Fetch of {0} was cancelled")]
    Cancelled(ContentId),

    /// The exchange failed for another reason.
    #[error("Exchange error: {0}")]
    Exchange(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepoError),
}
