//! # Peer Directory
//!
//! Thread-safe address book for the current online session. The swarm
//! marks peers connected and disconnected; the exchange reads it to pick
//! peers to ask.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use shared_types::{PeerAddr, PeerId};
use tracing::debug;

use crate::domain::peer::PeerInfo;

#[derive(Debug, Default)]
pub struct PeerDirectory {
    peers: RwLock<HashMap<PeerId, PeerInfo>>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record addresses for `peer`. Returns how many were new.
    pub fn add_addrs<'a>(&self, peer: PeerId, addrs: impl IntoIterator<Item = &'a PeerAddr>) -> usize {
        let mut peers = self.peers.write();
        let info = peers.entry(peer).or_insert_with(|| PeerInfo::new(peer));
        addrs.into_iter().filter(|a| info.add_addr(a)).count()
    }

    pub fn get(&self, peer: &PeerId) -> Option<PeerInfo> {
        self.peers.read().get(peer).cloned()
    }

    pub fn remove(&self, peer: &PeerId) -> Option<PeerInfo> {
        self.peers.write().remove(peer)
    }

    /// Every known peer, ordered by id.
    pub fn peers(&self) -> Vec<PeerInfo> {
        let mut peers: Vec<PeerInfo> = self.peers.read().values().cloned().collect();
        peers.sort_by(|a, b| a.peer_id.cmp(&b.peer_id));
        peers
    }

    /// Ids of peers currently marked connected, ordered by id.
    pub fn connected(&self) -> Vec<PeerId> {
        let mut ids: Vec<PeerId> = self
            .peers
            .read()
            .values()
            .filter(|p| p.connected)
            .map(|p| p.peer_id)
            .collect();
        ids.sort();
        ids
    }

    pub fn mark_connected(&self, peer: PeerId, via: Option<&PeerAddr>) {
        let mut peers = self.peers.write();
        let info = peers.entry(peer).or_insert_with(|| PeerInfo::new(peer));
        if let Some(addr) = via {
            info.add_addr(addr);
        }
        info.connected = true;
        info.last_seen = Some(Instant::now());
    }

    pub fn mark_disconnected(&self, peer: &PeerId) {
        if let Some(info) = self.peers.write().get_mut(peer) {
            info.connected = false;
        }
    }

    pub fn record_latency(&self, peer: &PeerId, latency: Duration) {
        if let Some(info) = self.peers.write().get_mut(peer) {
            info.latency = Some(latency);
            info.last_seen = Some(Instant::now());
        }
    }

    /// Load bootstrap addresses. Entries without a peer id are skipped.
    /// Returns the number of peers seeded.
    pub fn seed_from_bootstrap(&self, bootstrap: &[PeerAddr]) -> usize {
        let mut seeded = 0;
        for addr in bootstrap {
            match addr.peer() {
                Some(peer) => {
                    self.add_addrs(*peer, [addr]);
                    seeded += 1;
                }
                None => debug!("[cn-04] Skipping bootstrap address without peer id: {}", addr),
            }
        }
        seeded
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }
}
