//! # Node Container
//!
//! [`Node`] owns every long-lived component and hands out sub-API handles.
//! Components are built once, in dependency order; the network half is
//! created and destroyed only by the lifecycle controller.
//!
//! ```text
//! Repository ──→ Setup (identity + config)
//!     │             │
//!     ↓             ↓
//! BlockStore ──→ LifecycleController ──→ OnlineSession { Swarm, Exchange }
//!     ↑                                          │
//!     └────────── weak miss hook ────────────────┘
//! ```

pub mod config;

pub use config::{default_repo_path, NodeConfig, RepoSource};

use std::sync::Arc;
use std::time::Duration;

use cn_01_repository::Repository;
use cn_02_block_store::BlockStore;
use cn_05_swarm::{MemoryNetwork, Transport};
use shared_types::{PeerAddr, PeerId};
use tracing::{info, instrument};

use crate::api::{
    BlockApi, BootstrapApi, ConfigApi, ExchangeApi, FilesApi, GraphApi, IdentityApi, ObjectApi,
    PingApi, RepoApi, SwarmApi,
};
use crate::error::Result;
use crate::lifecycle::{Bootstrapper, LifecycleController, LifecycleState};
use crate::setup::{InitOptions, Setup};

/// A storage node.
pub struct Node {
    repo: Arc<Repository>,
    setup: Arc<Setup>,
    blocks: Arc<BlockStore>,
    lifecycle: Arc<LifecycleController>,
    default_bootstrap: Arc<[PeerAddr]>,
}

impl Node {
    /// Node over `config` using a private in-process transport.
    pub fn new(config: NodeConfig) -> Self {
        NodeBuilder::from_config(config).build()
    }

    pub fn builder() -> NodeBuilder {
        NodeBuilder::default()
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Create the node's identity. See [`Setup::init`].
    ///
    /// Fails `Busy` unless the node is offline. The node cannot go online
    /// until init returns.
    pub async fn init(&self, options: InitOptions) -> Result<PeerId> {
        let _hold = self.lifecycle.hold_offline("init")?;
        self.setup.init(options).await
    }

    /// Load the persisted identity and config.
    pub async fn load(&self) -> Result<()> {
        self.setup.load().await.map(|_| ())
    }

    pub async fn go_online(&self) -> Result<()> {
        self.lifecycle.go_online().await
    }

    pub async fn go_offline(&self) -> Result<()> {
        self.lifecycle.go_offline().await
    }

    pub fn is_online(&self) -> bool {
        self.lifecycle.is_online()
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn lifecycle(&self) -> &Arc<LifecycleController> {
        &self.lifecycle
    }

    /// Go offline and close the repository.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<()> {
        if self.lifecycle.state().is_transitioning() {
            self.lifecycle.settled().await;
        }
        self.lifecycle.go_offline().await?;
        self.repo.close().await?;
        info!("[Node] Shut down");
        Ok(())
    }

    // =========================================================================
    // SUB-APIS
    // =========================================================================

    pub fn identity(&self) -> IdentityApi {
        IdentityApi::new(Arc::clone(&self.setup), Arc::clone(&self.lifecycle))
    }

    pub fn repo(&self) -> RepoApi {
        RepoApi::new(Arc::clone(&self.repo))
    }

    pub fn config(&self) -> ConfigApi {
        ConfigApi::new(Arc::clone(&self.setup))
    }

    pub fn bootstrap(&self) -> BootstrapApi {
        BootstrapApi::new(Arc::clone(&self.setup), Arc::clone(&self.default_bootstrap))
    }

    pub fn block(&self) -> BlockApi {
        BlockApi::new(Arc::clone(&self.blocks))
    }

    pub fn graph(&self) -> GraphApi {
        GraphApi::new(Arc::clone(&self.blocks))
    }

    pub fn object(&self) -> ObjectApi {
        ObjectApi::new(Arc::clone(&self.blocks))
    }

    pub fn files(&self) -> FilesApi {
        FilesApi::new(Arc::clone(&self.blocks))
    }

    pub fn swarm(&self) -> SwarmApi {
        SwarmApi::new(Arc::clone(&self.lifecycle))
    }

    pub fn exchange(&self) -> ExchangeApi {
        ExchangeApi::new(Arc::clone(&self.lifecycle))
    }

    pub fn ping(&self) -> PingApi {
        PingApi::new(Arc::clone(&self.lifecycle))
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("repo", &self.repo)
            .field("state", &self.lifecycle.state())
            .field("generation", &self.lifecycle.generation())
            .finish()
    }
}

/// Builder for [`Node`].
#[derive(Default)]
pub struct NodeBuilder {
    config: NodeConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl NodeBuilder {
    pub fn from_config(config: NodeConfig) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    pub fn repo_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.config.repo = RepoSource::Path(path.into());
        self
    }

    pub fn repo_handle(mut self, repo: Arc<Repository>) -> Self {
        self.config.repo = RepoSource::Handle(repo);
        self
    }

    /// Transport used for every online session. Defaults to a fresh
    /// [`MemoryNetwork`] owned by this node alone.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout = Some(timeout);
        self
    }

    pub fn rebroadcast_interval(mut self, interval: Duration) -> Self {
        self.config.rebroadcast_interval = Some(interval);
        self
    }

    pub fn block_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.block_cache_capacity = capacity;
        self
    }

    pub fn default_bootstrap(mut self, addrs: Vec<PeerAddr>) -> Self {
        self.config.default_bootstrap = addrs;
        self
    }

    pub fn build(self) -> Node {
        let NodeConfig {
            repo,
            fetch_timeout,
            rebroadcast_interval,
            block_cache_capacity,
            default_bootstrap,
        } = self.config;

        let repo = repo.into_repository();
        let setup = Arc::new(Setup::new(Arc::clone(&repo)));
        let blocks = Arc::new(BlockStore::with_cache_capacity(
            Arc::clone(&repo),
            block_cache_capacity,
        ));
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(MemoryNetwork::new()));

        let lifecycle = Arc::new(LifecycleController::new(Bootstrapper {
            setup: Arc::clone(&setup),
            blocks: Arc::clone(&blocks),
            transport,
            fetch_timeout,
            rebroadcast_interval,
        }));

        info!("[Node] Built node over {:?}", repo);
        Node {
            repo,
            setup,
            blocks,
            lifecycle,
            default_bootstrap: default_bootstrap.into(),
        }
    }
}

#[cfg(test)]
mod tests;
