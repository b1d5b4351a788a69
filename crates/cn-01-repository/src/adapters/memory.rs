//! In-memory datastore.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::errors::RepoError;
use crate::domain::keys::validate_key;
use crate::ports::outbound::{BatchOperation, Datastore};

/// Datastore backed by an ordered map. Batches apply under one write lock.
#[derive(Default)]
pub struct MemoryDatastore {
    data: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

#[async_trait]
impl Datastore for MemoryDatastore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RepoError> {
        Ok(self.data.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), RepoError> {
        validate_key(key)?;
        self.data.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, RepoError> {
        Ok(self.data.write().remove(key).is_some())
    }

    async fn has(&self, key: &str) -> Result<bool, RepoError> {
        Ok(self.data.read().contains_key(key))
    }

    async fn query_prefix(&self, prefix: &str) -> Result<Vec<String>, RepoError> {
        Ok(self
            .data
            .read()
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), RepoError> {
        // Validate everything before touching the map.
        for op in &operations {
            validate_key(op.key())?;
        }
        let mut data = self.data.write();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn supports_atomic_batch(&self) -> bool {
        true
    }
}
