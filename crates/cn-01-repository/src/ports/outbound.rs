//! # Outbound Ports
//!
//! The [`Datastore`] trait abstracts the key-value backend under the
//! repository. Keys are slash-separated paths (see [`crate::domain::keys`]).

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::RepoError;

/// Abstract key-value backend.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Value stored at `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RepoError>;

    /// Store `value` at `key`, replacing any previous value.
    ///
    /// A single put is all-or-nothing: readers see the old value or the
    /// new one, never a prefix.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), RepoError>;

    /// Remove `key`. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, RepoError>;

    /// True when `key` holds a value.
    async fn has(&self, key: &str) -> Result<bool, RepoError>;

    /// Every key starting with `prefix`, sorted.
    async fn query_prefix(&self, prefix: &str) -> Result<Vec<String>, RepoError>;

    /// Apply several operations. All-or-nothing when
    /// [`Datastore::supports_atomic_batch`] is true, in order otherwise.
    async fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), RepoError>;

    /// Size in bytes of the value at `key`.
    async fn value_len(&self, key: &str) -> Result<Option<u64>, RepoError> {
        Ok(self.get(key).await?.map(|v| v.len() as u64))
    }

    /// Whether batches are applied atomically.
    fn supports_atomic_batch(&self) -> bool {
        false
    }

    /// On-disk root, for datastores that have one.
    fn root(&self) -> Option<&Path> {
        None
    }
}

/// A single operation in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
}

impl BatchOperation {
    /// Create a put operation.
    pub fn put(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a delete operation.
    pub fn delete(key: impl Into<String>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }

    /// Key this operation touches.
    pub fn key(&self) -> &str {
        match self {
            BatchOperation::Put { key, .. } | BatchOperation::Delete { key } => key,
        }
    }
}
