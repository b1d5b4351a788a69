//! # Repository Service
//!
//! Opens, locks and versions a datastore, and exposes the typed operations
//! the rest of the node needs: config commit/read, block storage and stats.
//!
//! Every operation other than [`Repository::open`] fails with
//! [`RepoError::Closed`] until the repository is open.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use shared_types::ContentId;
use tracing::{debug, info, warn};

use crate::adapters::{FsDatastore, MemoryDatastore, RepoLock};
use crate::domain::config::RepoConfig;
use crate::domain::errors::RepoError;
use crate::domain::keys::{self, BLOCKS_PREFIX, CONFIG_KEY, VERSION_KEY};
use crate::ports::outbound::{BatchOperation, Datastore};

/// Repository format version written by this crate.
pub const REPO_VERSION: u32 = 1;

/// Repository statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStat {
    /// Number of stored blocks.
    pub num_objects: u64,
    /// Total payload bytes of stored blocks.
    pub repo_size: u64,
    /// On-disk location, when the repository has one.
    pub path: Option<PathBuf>,
    pub version: u32,
}

/// Persistent home of a node.
pub struct Repository {
    datastore: Arc<dyn Datastore>,
    path: Option<PathBuf>,
    lock: Mutex<Option<RepoLock>>,
    open: AtomicBool,
    wipes: AtomicU64,
}

impl Repository {
    /// Repository over an arbitrary datastore.
    ///
    /// When `path` is set, `open` creates the directory and takes the
    /// process lock inside it.
    pub fn with_datastore(datastore: Arc<dyn Datastore>, path: Option<PathBuf>) -> Self {
        Self {
            datastore,
            path,
            lock: Mutex::new(None),
            open: AtomicBool::new(false),
            wipes: AtomicU64::new(0),
        }
    }

    /// Volatile repository.
    pub fn in_memory() -> Self {
        Self::with_datastore(Arc::new(MemoryDatastore::new()), None)
    }

    /// Filesystem repository rooted at `path`.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::with_datastore(Arc::new(FsDatastore::new(&path)), Some(path))
    }

    /// On-disk location, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn datastore(&self) -> &Arc<dyn Datastore> {
        &self.datastore
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Open the repository. Idempotent.
    ///
    /// Takes the process lock for path-backed repositories, writes the
    /// version marker on first open and rejects foreign versions.
    pub async fn open(&self) -> Result<(), RepoError> {
        if self.is_open() {
            return Ok(());
        }

        if let Some(path) = &self.path {
            tokio::fs::create_dir_all(path).await?;
            let lock = RepoLock::acquire(path).map_err(|e| RepoError::Locked {
                message: e.to_string(),
            })?;
            debug!("[cn-01] Acquired repository lock {}", lock.path().display());
            *self.lock.lock() = Some(lock);
        }

        if let Err(e) = self.check_version().await {
            self.lock.lock().take();
            return Err(e);
        }

        self.open.store(true, Ordering::Release);
        match &self.path {
            Some(path) => info!("[cn-01] Repository opened at {}", path.display()),
            None => info!("[cn-01] In-memory repository opened"),
        }
        Ok(())
    }

    /// Close the repository and release the lock. Idempotent.
    pub async fn close(&self) -> Result<(), RepoError> {
        if self.open.swap(false, Ordering::AcqRel) {
            self.lock.lock().take();
            info!("[cn-01] Repository closed");
        }
        Ok(())
    }

    async fn check_version(&self) -> Result<(), RepoError> {
        match self.datastore.get(VERSION_KEY).await? {
            None => {
                self.datastore
                    .put(VERSION_KEY, REPO_VERSION.to_string().as_bytes())
                    .await
            }
            Some(bytes) => {
                let found = parse_version(&bytes)?;
                if found != REPO_VERSION {
                    return Err(RepoError::VersionMismatch {
                        found,
                        expected: REPO_VERSION,
                    });
                }
                Ok(())
            }
        }
    }

    fn ensure_open(&self) -> Result<(), RepoError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(RepoError::Closed)
        }
    }

    /// Repository format version.
    pub async fn version(&self) -> Result<u32, RepoError> {
        self.ensure_open()?;
        match self.datastore.get(VERSION_KEY).await? {
            Some(bytes) => parse_version(&bytes),
            None => Ok(REPO_VERSION),
        }
    }

    // =========================================================================
    // CONFIG
    // =========================================================================

    /// True once a config document has been committed.
    pub async fn is_initialized(&self) -> Result<bool, RepoError> {
        self.ensure_open()?;
        self.datastore.has(CONFIG_KEY).await
    }

    /// The stored config document.
    pub async fn read_config(&self) -> Result<Option<RepoConfig>, RepoError> {
        self.ensure_open()?;
        let Some(bytes) = self.datastore.get(CONFIG_KEY).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| RepoError::Corrupt {
                key: CONFIG_KEY.to_string(),
                message: e.to_string(),
            })
    }

    /// Persist `config` as a single write.
    pub async fn commit_config(&self, config: &RepoConfig) -> Result<(), RepoError> {
        self.ensure_open()?;
        let bytes = serde_json::to_vec_pretty(config)?;
        self.datastore.put(CONFIG_KEY, &bytes).await?;
        debug!("[cn-01] Config committed ({} bytes)", bytes.len());
        Ok(())
    }

    /// Remove the config document and every stored block.
    pub async fn wipe(&self) -> Result<(), RepoError> {
        self.clear_blocks(BatchOperation::delete(CONFIG_KEY)).await
    }

    /// Replace the config document with `config` and remove every stored
    /// block.
    ///
    /// On an atomic datastore this is one batch. Otherwise the blocks go
    /// first and the config is written last, so a failure midway leaves
    /// the previous config in place.
    pub async fn reset(&self, config: &RepoConfig) -> Result<(), RepoError> {
        self.ensure_open()?;
        let bytes = serde_json::to_vec_pretty(config)?;
        self.clear_blocks(BatchOperation::put(CONFIG_KEY, bytes)).await
    }

    async fn clear_blocks(&self, config_op: BatchOperation) -> Result<(), RepoError> {
        self.ensure_open()?;
        let mut operations: Vec<BatchOperation> = self
            .datastore
            .query_prefix(BLOCKS_PREFIX)
            .await?
            .into_iter()
            .map(BatchOperation::delete)
            .collect();
        let removed_blocks = operations.len();
        let removes_config = matches!(config_op, BatchOperation::Delete { .. });

        if !self.datastore.supports_atomic_batch() {
            warn!(
                "[cn-01] Datastore cannot batch atomically; applying {} operations one by one",
                operations.len() + 1
            );
        }
        if removes_config && !self.datastore.supports_atomic_batch() {
            // Config goes first so a failure midway leaves an uninitialized repo.
            operations.insert(0, config_op);
        } else {
            operations.push(config_op);
        }

        let written = self.datastore.atomic_batch_write(operations).await;
        // Blocks may be gone even when the batch failed partway.
        self.wipes.fetch_add(1, Ordering::AcqRel);
        written?;

        warn!("[cn-01] Repository wiped ({} blocks removed)", removed_blocks);
        Ok(())
    }

    /// Number of wipes and resets applied since construction.
    ///
    /// Anything caching repository contents should drop its copies when
    /// this changes.
    pub fn wipe_count(&self) -> u64 {
        self.wipes.load(Ordering::Acquire)
    }

    // =========================================================================
    // BLOCKS
    // =========================================================================

    /// Payload stored for `cid`.
    pub async fn get_block(&self, cid: &ContentId) -> Result<Option<Vec<u8>>, RepoError> {
        self.ensure_open()?;
        self.datastore.get(&keys::block_key(cid)).await
    }

    /// Store a payload under `cid`. Storing an existing block is a no-op.
    ///
    /// The caller is responsible for having verified `data` against `cid`.
    pub async fn put_block(&self, cid: &ContentId, data: &[u8]) -> Result<(), RepoError> {
        self.ensure_open()?;
        let key = keys::block_key(cid);
        if self.datastore.has(&key).await? {
            return Ok(());
        }
        self.datastore.put(&key, data).await
    }

    pub async fn has_block(&self, cid: &ContentId) -> Result<bool, RepoError> {
        self.ensure_open()?;
        self.datastore.has(&keys::block_key(cid)).await
    }

    /// Remove the block for `cid`. Returns whether it existed.
    pub async fn delete_block(&self, cid: &ContentId) -> Result<bool, RepoError> {
        self.ensure_open()?;
        self.datastore.delete(&keys::block_key(cid)).await
    }

    /// Ids of every stored block.
    pub async fn list_blocks(&self) -> Result<Vec<ContentId>, RepoError> {
        self.ensure_open()?;
        Ok(self
            .datastore
            .query_prefix(BLOCKS_PREFIX)
            .await?
            .iter()
            .filter_map(|key| keys::cid_from_block_key(key))
            .collect())
    }

    /// Block count, total size, location and version.
    pub async fn stat(&self) -> Result<RepoStat, RepoError> {
        self.ensure_open()?;
        let block_keys = self.datastore.query_prefix(BLOCKS_PREFIX).await?;
        let mut repo_size = 0u64;
        for key in &block_keys {
            repo_size += self.datastore.value_len(key).await?.unwrap_or(0);
        }
        Ok(RepoStat {
            num_objects: block_keys.len() as u64,
            repo_size,
            path: self.path.clone(),
            version: self.version().await?,
        })
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish()
    }
}

fn parse_version(bytes: &[u8]) -> Result<u32, RepoError> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| RepoError::Corrupt {
            key: VERSION_KEY.to_string(),
            message: "version is not a number".to_string(),
        })
}
