//! # Online Sessions
//!
//! One [`OnlineSession`] exists per successful `go_online`. It is built by
//! [`Bootstrapper::start`] in a fixed order and torn down by
//! [`Bootstrapper::stop`] in the reverse order.
//!
//! | Stage | Builds | Undone when the stage fails |
//! |-------|--------|-----------------------------|
//! | load | identity + config | nothing |
//! | swarm | `PeerDirectory` seeded from bootstrap, `Swarm` | nothing |
//! | listen | listeners, best-effort bootstrap dials | swarm closed |
//! | exchange | `ExchangeService`, block store hook | swarm closed |
//!
//! A bootstrap that unwinds midway still closes the swarm it built.

use std::sync::Arc;
use std::time::Duration;

use cn_02_block_store::{BlockStore, ExchangeHook};
use cn_04_peers::PeerDirectory;
use cn_05_swarm::{Swarm, SwarmConfig, Transport};
use cn_06_exchange::{ExchangeConfig, ExchangeService};
use tracing::{debug, info, warn};

use crate::error::{BootstrapStage, NodeError, Result};
use crate::setup::Setup;

/// Network subsystems of one online session.
pub struct OnlineSession {
    swarm: Arc<dyn Swarm>,
    exchange: Arc<ExchangeService>,
    directory: Arc<PeerDirectory>,
    generation: u64,
}

impl OnlineSession {
    pub fn swarm(&self) -> &Arc<dyn Swarm> {
        &self.swarm
    }

    pub fn exchange(&self) -> &Arc<ExchangeService> {
        &self.exchange
    }

    pub fn directory(&self) -> &Arc<PeerDirectory> {
        &self.directory
    }

    /// Number of the online transition that built this session.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::fmt::Debug for OnlineSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnlineSession")
            .field("peer", &self.swarm.local_peer_id())
            .field("generation", &self.generation)
            .finish()
    }
}

/// Network half of the node.
#[derive(Debug, Clone, Default)]
pub enum NetworkState {
    #[default]
    Offline,
    Online(Arc<OnlineSession>),
}

impl NetworkState {
    pub fn session(&self) -> Option<&Arc<OnlineSession>> {
        match self {
            NetworkState::Offline => None,
            NetworkState::Online(session) => Some(session),
        }
    }
}

/// Builds and tears down sessions from the node's long-lived parts.
pub(crate) struct Bootstrapper {
    pub(crate) setup: Arc<Setup>,
    pub(crate) blocks: Arc<BlockStore>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) fetch_timeout: Option<Duration>,
    pub(crate) rebroadcast_interval: Option<Duration>,
}

impl Bootstrapper {
    /// Run the bootstrap stages for session `generation`.
    ///
    /// A load failure is returned as is. Later failures undo whatever the
    /// earlier stages built and surface as `PartialBootstrapFailure`.
    pub(crate) async fn start(&self, generation: u64) -> Result<OnlineSession> {
        let loaded = self.setup.load().await?;
        let config = &loaded.config;

        // Swarm
        let directory = Arc::new(PeerDirectory::new());
        let seeded = directory.seed_from_bootstrap(&config.bootstrap);
        let swarm_config = SwarmConfig {
            connection_limit: config.swarm.connection_limit,
            ..SwarmConfig::default()
        };
        let swarm = self
            .transport
            .create_swarm(
                Arc::clone(&loaded.identity),
                Arc::clone(&directory),
                swarm_config,
            )
            .await
            .map_err(|e| NodeError::bootstrap(BootstrapStage::Swarm, e))?;
        debug!("[Lifecycle] Swarm created, {} bootstrap peers seeded", seeded);
        let rollback = Rollback::new(&swarm);

        // Listen
        let bound = match swarm.listen(&config.addresses.swarm).await {
            Ok(bound) => bound,
            Err(e) => {
                rollback.run().await;
                return Err(NodeError::bootstrap(BootstrapStage::Listen, e));
            }
        };
        for addr in &bound {
            info!("[Lifecycle] Swarm listening on {}", addr);
        }
        self.dial_bootstrap(&swarm, config.bootstrap.as_slice()).await;

        // Exchange
        let exchange_config = ExchangeConfig {
            fetch_timeout: self
                .fetch_timeout
                .unwrap_or(Duration::from_millis(config.exchange.fetch_timeout_ms)),
            rebroadcast_interval: self
                .rebroadcast_interval
                .unwrap_or(Duration::from_millis(config.exchange.rebroadcast_interval_ms)),
        };
        let exchange = match ExchangeService::start(
            Arc::clone(&swarm),
            Arc::clone(&self.blocks),
            exchange_config,
        ) {
            Ok(exchange) => exchange,
            Err(e) => {
                rollback.run().await;
                return Err(NodeError::bootstrap(BootstrapStage::Exchange, e));
            }
        };
        let hook: Arc<dyn ExchangeHook> = exchange.clone();
        self.blocks.attach_exchange(Arc::downgrade(&hook));
        rollback.disarm();

        Ok(OnlineSession {
            swarm,
            exchange,
            directory,
            generation,
        })
    }

    async fn dial_bootstrap(&self, swarm: &Arc<dyn Swarm>, bootstrap: &[shared_types::PeerAddr]) {
        let local = swarm.local_peer_id();
        for addr in bootstrap {
            if addr.peer() == Some(&local) {
                continue;
            }
            match swarm.dial(addr).await {
                Ok(peer) => info!("[Lifecycle] Connected to bootstrap peer {}", peer.short()),
                Err(e) => warn!("[Lifecycle] Bootstrap dial to {} failed: {}", addr, e),
            }
        }
    }

    /// Tear `session` down. Returns the failures met along the way.
    pub(crate) async fn stop(&self, session: &OnlineSession) -> Vec<String> {
        let mut failures = Vec::new();

        session.exchange.stop().await;
        if let Err(e) = session.swarm.close().await {
            failures.push(format!("swarm close: {e}"));
        }
        self.blocks.detach_exchange();

        failures
    }
}

async fn close_quietly(swarm: &Arc<dyn Swarm>) {
    if let Err(e) = swarm.close().await {
        warn!("[Lifecycle] Rollback could not close swarm: {}", e);
    }
}

/// Closes a half-built session's swarm unless disarmed.
struct Rollback {
    swarm: Option<Arc<dyn Swarm>>,
}

impl Rollback {
    fn new(swarm: &Arc<dyn Swarm>) -> Self {
        Self {
            swarm: Some(Arc::clone(swarm)),
        }
    }

    async fn run(mut self) {
        if let Some(swarm) = self.swarm.take() {
            close_quietly(&swarm).await;
        }
    }

    fn disarm(mut self) {
        self.swarm = None;
    }
}

impl Drop for Rollback {
    fn drop(&mut self) {
        let Some(swarm) = self.swarm.take() else {
            return;
        };
        warn!("[Lifecycle] Bootstrap abandoned midway, closing swarm");
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move { close_quietly(&swarm).await });
        }
    }
}
