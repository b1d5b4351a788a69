//! Connections of the current session.

use std::sync::Arc;

use cn_04_peers::PeerInfo;
use shared_types::{PeerAddr, PeerId};
use tracing::info;

use super::online;
use crate::error::{NodeError, Result};
use crate::lifecycle::LifecycleController;

#[derive(Clone)]
pub struct SwarmApi {
    lifecycle: Arc<LifecycleController>,
}

impl SwarmApi {
    pub(crate) fn new(lifecycle: Arc<LifecycleController>) -> Self {
        Self { lifecycle }
    }

    /// Connected peers.
    pub fn peers(&self) -> Result<Vec<PeerInfo>> {
        let session = online(&self.lifecycle)?;
        Ok(session
            .directory()
            .peers()
            .into_iter()
            .filter(|peer| peer.connected)
            .collect())
    }

    /// Every peer in the address book, connected or not.
    pub fn addrs(&self) -> Result<Vec<PeerInfo>> {
        Ok(online(&self.lifecycle)?.directory().peers())
    }

    pub fn local_addrs(&self) -> Result<Vec<PeerAddr>> {
        Ok(online(&self.lifecycle)?.swarm().listen_addrs())
    }

    /// Dial `addr`. Returns the remote peer id.
    pub async fn connect(&self, addr: &PeerAddr) -> Result<PeerId> {
        let session = online(&self.lifecycle)?;
        let peer = session.swarm().dial(addr).await?;
        info!("[Swarm] Connected to {}", peer.short());
        Ok(peer)
    }

    /// Hang up on the peer named by `addr`'s peer component.
    pub async fn disconnect(&self, addr: &PeerAddr) -> Result<()> {
        let peer = addr
            .peer()
            .copied()
            .ok_or_else(|| NodeError::InvalidInput(format!("{addr} has no peer id")))?;
        self.disconnect_peer(&peer).await
    }

    pub async fn disconnect_peer(&self, peer: &PeerId) -> Result<()> {
        let session = online(&self.lifecycle)?;
        session.swarm().hang_up(peer).await?;
        Ok(())
    }
}
