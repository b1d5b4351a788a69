//! Node identity and version.

use std::sync::Arc;

use cn_01_repository::REPO_VERSION;
use shared_types::{PeerAddr, PeerId};

use crate::error::Result;
use crate::lifecycle::LifecycleController;
use crate::setup::Setup;

/// Agent string advertised by this build.
pub const AGENT_VERSION: &str = concat!("cairn/", env!("CARGO_PKG_VERSION"));

/// Protocol family spoken on the swarm.
pub const PROTOCOL_VERSION: &str = "cairn/1.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityInfo {
    pub id: PeerId,
    /// Hex Ed25519 public key.
    pub public_key: String,
    /// Listen addresses with the peer id appended. Empty while offline.
    pub addresses: Vec<PeerAddr>,
    pub agent_version: String,
    pub protocol_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
    pub repo: u32,
    pub system: String,
}

#[derive(Clone)]
pub struct IdentityApi {
    setup: Arc<Setup>,
    lifecycle: Arc<LifecycleController>,
}

impl IdentityApi {
    pub(crate) fn new(setup: Arc<Setup>, lifecycle: Arc<LifecycleController>) -> Self {
        Self { setup, lifecycle }
    }

    pub async fn id(&self) -> Result<IdentityInfo> {
        let loaded = self.setup.load().await?;
        let id = loaded.identity.peer_id();
        let addresses = match self.lifecycle.session() {
            Some(session) => session
                .swarm()
                .listen_addrs()
                .into_iter()
                .map(|addr| addr.with_peer(id))
                .collect(),
            None => Vec::new(),
        };

        Ok(IdentityInfo {
            id,
            public_key: hex::encode(loaded.identity.public_key()),
            addresses,
            agent_version: AGENT_VERSION.to_string(),
            protocol_version: PROTOCOL_VERSION.to_string(),
        })
    }

    pub fn version(&self) -> VersionInfo {
        VersionInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            repo: REPO_VERSION,
            system: format!("{}/{}", std::env::consts::ARCH, std::env::consts::OS),
        }
    }
}
