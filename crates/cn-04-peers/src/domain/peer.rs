//! Peer entry held by the directory.

use std::time::{Duration, Instant};

use shared_types::{PeerAddr, PeerId};

/// What the node knows about one remote peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub peer_id: PeerId,
    /// Known transport addresses, without the peer id component.
    pub addrs: Vec<PeerAddr>,
    pub connected: bool,
    /// Last measured round trip.
    pub latency: Option<Duration>,
    pub last_seen: Option<Instant>,
}

impl PeerInfo {
    pub fn new(peer_id: PeerId) -> Self {
        Self {
            peer_id,
            addrs: Vec::new(),
            connected: false,
            latency: None,
            last_seen: None,
        }
    }

    /// Add `addr` (peer component stripped) unless already known.
    pub fn add_addr(&mut self, addr: &PeerAddr) -> bool {
        let addr = addr.without_peer();
        if self.addrs.contains(&addr) {
            return false;
        }
        self.addrs.push(addr);
        true
    }

    /// Addresses with this peer's id appended, ready to dial.
    pub fn dialable_addrs(&self) -> Vec<PeerAddr> {
        self.addrs
            .iter()
            .map(|a| a.clone().with_peer(self.peer_id))
            .collect()
    }
}
