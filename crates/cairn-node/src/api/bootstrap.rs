//! Persisted bootstrap list.
//!
//! Entries must carry a peer id (`/<transport>/<addr>/p2p/<peer-id>`). The
//! list is read when the node goes online; edits take effect on the next
//! session.

use std::sync::Arc;

use shared_types::PeerAddr;

use crate::error::{NodeError, Result};
use crate::setup::Setup;

#[derive(Clone)]
pub struct BootstrapApi {
    setup: Arc<Setup>,
    defaults: Arc<[PeerAddr]>,
}

impl BootstrapApi {
    pub(crate) fn new(setup: Arc<Setup>, defaults: Arc<[PeerAddr]>) -> Self {
        Self { setup, defaults }
    }

    pub async fn list(&self) -> Result<Vec<PeerAddr>> {
        Ok(self.setup.load().await?.config.bootstrap.clone())
    }

    /// Append `addr` unless present. Returns the addresses actually added.
    pub async fn add(&self, addr: PeerAddr) -> Result<Vec<PeerAddr>> {
        if addr.peer().is_none() {
            return Err(NodeError::InvalidInput(format!(
                "bootstrap address {addr} has no peer id"
            )));
        }
        self.add_all(vec![addr]).await
    }

    /// Append the configured default peers. Returns the addresses added.
    pub async fn add_defaults(&self) -> Result<Vec<PeerAddr>> {
        self.add_all(self.defaults.to_vec()).await
    }

    /// Remove `addr`. Returns the addresses removed.
    pub async fn rm(&self, addr: &PeerAddr) -> Result<Vec<PeerAddr>> {
        let mut removed = Vec::new();
        self.setup
            .update_config(|config| {
                let mut next = config.clone();
                next.bootstrap.retain(|existing| {
                    let keep = existing != addr;
                    if !keep {
                        removed.push(existing.clone());
                    }
                    keep
                });
                Ok(next)
            })
            .await?;
        Ok(removed)
    }

    /// Empty the list. Returns the addresses removed.
    pub async fn rm_all(&self) -> Result<Vec<PeerAddr>> {
        let mut removed = Vec::new();
        self.setup
            .update_config(|config| {
                let mut next = config.clone();
                removed = std::mem::take(&mut next.bootstrap);
                Ok(next)
            })
            .await?;
        Ok(removed)
    }

    async fn add_all(&self, addrs: Vec<PeerAddr>) -> Result<Vec<PeerAddr>> {
        let mut added = Vec::new();
        self.setup
            .update_config(|config| {
                let mut next = config.clone();
                for addr in addrs {
                    if !next.bootstrap.contains(&addr) {
                        next.bootstrap.push(addr.clone());
                        added.push(addr);
                    }
                }
                Ok(next)
            })
            .await?;
        Ok(added)
    }
}
