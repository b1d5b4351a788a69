//! # Filesystem Datastore
//!
//! One file per key under a root directory: `/blocks/ab/f0155...` lives at
//! `<root>/blocks/ab/f0155...`. Puts write a hidden temp file next to the
//! target and rename it into place.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::domain::errors::RepoError;
use crate::domain::keys::validate_key;
use crate::ports::outbound::{BatchOperation, Datastore};

/// File-per-key datastore.
#[derive(Debug, Clone)]
pub struct FsDatastore {
    root: PathBuf,
}

impl FsDatastore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, RepoError> {
        validate_key(key)?;
        let mut path = self.root.clone();
        for segment in key.trim_start_matches('/').split('/') {
            path.push(segment);
        }
        Ok(path)
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut key = String::new();
        for component in relative.components() {
            key.push('/');
            key.push_str(component.as_os_str().to_str()?);
        }
        Some(key)
    }

    async fn write_atomic(&self, path: &Path, value: &[u8]) -> io::Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "key has no parent"))?;
        tokio::fs::create_dir_all(parent).await?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("entry");
        let tmp = parent.join(format!(".{}.tmp-{:016x}", name, rand::random::<u64>()));

        let mut file = tokio::fs::File::create(&tmp).await?;
        let written = async {
            file.write_all(value).await?;
            file.sync_all().await
        }
        .await;
        drop(file);
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }

        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl Datastore for FsDatastore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RepoError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), RepoError> {
        let path = self.path_for(key)?;
        self.write_atomic(&path, value).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, RepoError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn has(&self, key: &str) -> Result<bool, RepoError> {
        let path = self.path_for(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn query_prefix(&self, prefix: &str) -> Result<Vec<String>, RepoError> {
        // Start the walk at the deepest directory the prefix fully names.
        let dir_part = match prefix.rfind('/') {
            Some(idx) => &prefix[..idx],
            None => "",
        };
        let start = if dir_part.is_empty() {
            self.root.clone()
        } else {
            self.path_for(dir_part)?
        };

        let mut keys = Vec::new();
        let mut pending = vec![start];
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                if name.to_str().map_or(true, |n| n.starts_with('.')) {
                    continue;
                }
                let file_type = entry.file_type().await?;
                let path = entry.path();
                if file_type.is_dir() {
                    pending.push(path);
                } else if let Some(key) = self.key_for(&path) {
                    if key.starts_with(prefix) {
                        keys.push(key);
                    }
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), RepoError> {
        for op in &operations {
            validate_key(op.key())?;
        }
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => self.put(&key, &value).await?,
                BatchOperation::Delete { key } => {
                    self.delete(&key).await?;
                }
            }
        }
        Ok(())
    }

    async fn value_len(&self, key: &str) -> Result<Option<u64>, RepoError> {
        let path = self.path_for(key)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn root(&self) -> Option<&Path> {
        Some(&self.root)
    }
}
