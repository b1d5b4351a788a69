//! # Init & Load
//!
//! `init` creates the node's identity and commits it, embedded in the
//! default config document, as a single repository write. A forced
//! re-init swaps the config and drops the blocks in that same write. `load` reads that
//! document back into memory. Both run behind one gate so a load never
//! interleaves with a half-finished init.

use std::sync::Arc;

use cn_01_repository::{RepoConfig, Repository};
use cn_04_peers::{PeerIdentity, DEFAULT_KEY_BITS};
use parking_lot::RwLock;
use shared_types::PeerId;
use tracing::{debug, info, instrument, warn};

use crate::error::{NodeError, Result};

/// Options for [`Setup::init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOptions {
    /// Entropy size for key generation.
    pub bits: u32,
    /// Wipe an existing repository (config and blocks) and start over.
    pub empty_repo: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            bits: DEFAULT_KEY_BITS,
            empty_repo: false,
        }
    }
}

impl InitOptions {
    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    pub fn force(mut self) -> Self {
        self.empty_repo = true;
        self
    }
}

/// Identity and config as currently held in memory.
#[derive(Debug)]
pub struct LoadedRepo {
    pub identity: Arc<PeerIdentity>,
    pub config: RepoConfig,
}

/// Owner of the in-memory identity and config.
pub struct Setup {
    repo: Arc<Repository>,
    gate: tokio::sync::Mutex<()>,
    loaded: RwLock<Option<Arc<LoadedRepo>>>,
}

impl Setup {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self {
            repo,
            gate: tokio::sync::Mutex::new(()),
            loaded: RwLock::new(None),
        }
    }

    pub fn repository(&self) -> &Arc<Repository> {
        &self.repo
    }

    /// Create and persist a fresh identity.
    ///
    /// Fails `AlreadyInitialized` when the repository already holds a
    /// config, unless `empty_repo` is set. Any identity loaded before the
    /// call is forgotten.
    #[instrument(skip(self))]
    pub async fn init(&self, options: InitOptions) -> Result<PeerId> {
        let _gate = self.gate.lock().await;
        self.repo.open().await?;

        let initialized = self.repo.is_initialized().await?;
        if initialized && !options.empty_repo {
            return Err(NodeError::AlreadyInitialized);
        }

        // Keys first, so a bad key size leaves the repository untouched.
        let bits = options.bits;
        let identity = tokio::task::spawn_blocking(move || PeerIdentity::generate(bits))
            .await
            .map_err(|e| NodeError::Cancelled(format!("key generation: {e}")))??;

        self.loaded.write().take();
        let config = RepoConfig::new(identity.to_record());
        if initialized {
            warn!("[Setup] Re-initializing: wiping existing repository");
            self.repo.reset(&config).await?;
        } else {
            self.repo.commit_config(&config).await?;
        }

        let peer_id = identity.peer_id();
        info!("[Setup] Initialized repository with identity {}", peer_id);
        Ok(peer_id)
    }

    /// Load identity and config. Idempotent once loaded.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Arc<LoadedRepo>> {
        if let Some(loaded) = self.loaded() {
            return Ok(loaded);
        }
        let _gate = self.gate.lock().await;
        if let Some(loaded) = self.loaded() {
            return Ok(loaded);
        }
        self.load_locked().await
    }

    async fn load_locked(&self) -> Result<Arc<LoadedRepo>> {
        self.repo.open().await?;
        let config = self
            .repo
            .read_config()
            .await?
            .ok_or(NodeError::NotInitialized)?;
        let identity = Arc::new(PeerIdentity::from_record(&config.identity)?);

        debug!("[Setup] Loaded identity {}", identity.peer_id());
        let loaded = Arc::new(LoadedRepo { identity, config });
        *self.loaded.write() = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// The loaded state, if `load` has completed since the last `init`.
    pub fn loaded(&self) -> Option<Arc<LoadedRepo>> {
        self.loaded.read().clone()
    }

    /// Apply `edit` to the config document and commit the result.
    ///
    /// The identity section is carried over from the loaded state whatever
    /// `edit` does to it.
    pub async fn update_config<F>(&self, edit: F) -> Result<RepoConfig>
    where
        F: FnOnce(&RepoConfig) -> Result<RepoConfig>,
    {
        let _gate = self.gate.lock().await;
        let current = match self.loaded() {
            Some(loaded) => loaded,
            None => self.load_locked().await?,
        };

        let mut next = edit(&current.config)?;
        next.identity = current.config.identity.clone();
        if next == current.config {
            return Ok(next);
        }

        self.repo.commit_config(&next).await?;
        *self.loaded.write() = Some(Arc::new(LoadedRepo {
            identity: Arc::clone(&current.identity),
            config: next.clone(),
        }));
        debug!("[Setup] Config updated");
        Ok(next)
    }
}
