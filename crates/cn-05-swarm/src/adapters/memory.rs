//! # Memory Transport
//!
//! Swarms created from the same [`MemoryNetwork`] can dial each other by
//! `/memory/<port>` address. Connections are symmetric: a dial registers the
//! connection on both ends, and closing either end removes it from both.
//! Requests invoke the remote protocol handler directly.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cn_04_peers::{PeerDirectory, PeerIdentity};
use parking_lot::{Mutex, RwLock};
use shared_types::{PeerAddr, PeerId};
use tracing::{debug, info};

use crate::domain::config::SwarmConfig;
use crate::domain::errors::SwarmError;
use crate::ports::{ProtocolHandler, Swarm, Transport};

const PROTOCOL: &str = "memory";

/// Shared in-process network. Cloning yields another handle on the same
/// network.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    inner: Arc<NetworkInner>,
}

#[derive(Default)]
struct NetworkInner {
    listeners: Mutex<HashMap<u64, Weak<SwarmShared>>>,
    next_port: AtomicU64,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bound listen ports.
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    fn bind(&self, port: u64, swarm: &Arc<SwarmShared>) -> Option<u64> {
        let mut listeners = self.inner.listeners.lock();
        listeners.retain(|_, w| w.strong_count() > 0);

        let port = if port == 0 {
            loop {
                let candidate = self.inner.next_port.fetch_add(1, Ordering::Relaxed) + 1;
                if !listeners.contains_key(&candidate) {
                    break candidate;
                }
            }
        } else if listeners.contains_key(&port) {
            return None;
        } else {
            port
        };
        listeners.insert(port, Arc::downgrade(swarm));
        Some(port)
    }

    fn unbind(&self, port: u64) {
        self.inner.listeners.lock().remove(&port);
    }

    fn lookup(&self, port: u64) -> Option<Arc<SwarmShared>> {
        self.inner.listeners.lock().get(&port).and_then(Weak::upgrade)
    }
}

#[async_trait]
impl Transport for MemoryNetwork {
    async fn create_swarm(
        &self,
        identity: Arc<PeerIdentity>,
        directory: Arc<PeerDirectory>,
        config: SwarmConfig,
    ) -> Result<Arc<dyn Swarm>, SwarmError> {
        let swarm = MemorySwarm {
            shared: Arc::new(SwarmShared {
                local: identity.peer_id(),
                network: self.clone(),
                directory,
                config,
                listening: Mutex::new(Vec::new()),
                connections: Mutex::new(HashMap::new()),
                protocols: RwLock::new(HashMap::new()),
                closed: AtomicBool::new(false),
            }),
        };
        debug!("[cn-05] Created memory swarm for {}", identity.peer_id().short());
        Ok(Arc::new(swarm))
    }
}

struct SwarmShared {
    local: PeerId,
    network: MemoryNetwork,
    directory: Arc<PeerDirectory>,
    config: SwarmConfig,
    listening: Mutex<Vec<(u64, PeerAddr)>>,
    connections: Mutex<HashMap<PeerId, Weak<SwarmShared>>>,
    protocols: RwLock<HashMap<String, Arc<dyn ProtocolHandler>>>,
    closed: AtomicBool,
}

impl SwarmShared {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn first_listen_addr(&self) -> Option<PeerAddr> {
        self.listening.lock().first().map(|(_, addr)| addr.clone())
    }

    fn remote(&self, peer: &PeerId) -> Option<Arc<SwarmShared>> {
        self.connections
            .lock()
            .get(peer)
            .and_then(Weak::upgrade)
            .filter(|remote| !remote.is_closed())
    }

    fn drop_connection(&self, peer: &PeerId) -> Option<Arc<SwarmShared>> {
        let remote = self.connections.lock().remove(peer);
        self.directory.mark_disconnected(peer);
        remote.and_then(|w| w.upgrade())
    }
}

/// Swarm over a [`MemoryNetwork`].
pub struct MemorySwarm {
    shared: Arc<SwarmShared>,
}

impl MemorySwarm {
    fn ensure_open(&self) -> Result<(), SwarmError> {
        if self.shared.is_closed() {
            Err(SwarmError::Closed)
        } else {
            Ok(())
        }
    }
}

fn parse_port(addr: &PeerAddr) -> Result<u64, SwarmError> {
    if addr.protocol() != PROTOCOL {
        return Err(SwarmError::UnsupportedTransport(addr.clone()));
    }
    let mut parts = addr.transport().trim_start_matches('/').split('/').skip(1);
    match (parts.next().map(str::parse::<u64>), parts.next()) {
        (Some(Ok(port)), None) => Ok(port),
        _ => Err(SwarmError::UnsupportedTransport(addr.clone())),
    }
}

#[async_trait]
impl Swarm for MemorySwarm {
    fn local_peer_id(&self) -> PeerId {
        self.shared.local
    }

    async fn listen(&self, addrs: &[PeerAddr]) -> Result<Vec<PeerAddr>, SwarmError> {
        self.ensure_open()?;
        let mut bound = Vec::with_capacity(addrs.len());
        for addr in addrs {
            let port = parse_port(addr)?;
            let port = self
                .shared
                .network
                .bind(port, &self.shared)
                .ok_or_else(|| SwarmError::AddressInUse(addr.clone()))?;
            let actual = PeerAddr::new(format!("/{PROTOCOL}/{port}"));
            info!("[cn-05] Listening on {}", actual);
            self.shared.listening.lock().push((port, actual.clone()));
            bound.push(actual);
        }
        Ok(bound)
    }

    fn listen_addrs(&self) -> Vec<PeerAddr> {
        self.shared
            .listening
            .lock()
            .iter()
            .map(|(_, addr)| addr.clone())
            .collect()
    }

    async fn dial(&self, addr: &PeerAddr) -> Result<PeerId, SwarmError> {
        self.ensure_open()?;
        let port = parse_port(addr)?;
        let dial_failed = |reason: &str| SwarmError::DialFailed {
            addr: addr.clone(),
            reason: reason.to_string(),
        };

        let remote = self
            .shared
            .network
            .lookup(port)
            .filter(|r| !r.is_closed())
            .ok_or_else(|| dial_failed("no listener"))?;
        if remote.local == self.shared.local {
            return Err(dial_failed("cannot dial self"));
        }
        if let Some(expected) = addr.peer() {
            if *expected != remote.local {
                return Err(SwarmError::PeerMismatch {
                    expected: *expected,
                    actual: remote.local,
                });
            }
        }
        if self.is_connected(&remote.local) {
            return Ok(remote.local);
        }

        {
            // Lock both tables in peer id order so crossing dials cannot deadlock.
            let local_first = self.shared.local < remote.local;
            let (first, second) = if local_first {
                (&self.shared, &remote)
            } else {
                (&remote, &self.shared)
            };
            let first_guard = first.connections.lock();
            let second_guard = second.connections.lock();
            let (mut ours, mut theirs) = if local_first {
                (first_guard, second_guard)
            } else {
                (second_guard, first_guard)
            };

            if ours.len() >= self.shared.config.connection_limit {
                return Err(SwarmError::ConnectionLimit(self.shared.config.connection_limit));
            }
            if theirs.len() >= remote.config.connection_limit {
                return Err(dial_failed("remote connection limit reached"));
            }
            ours.insert(remote.local, Arc::downgrade(&remote));
            theirs.insert(self.shared.local, Arc::downgrade(&self.shared));
        }

        self.shared
            .directory
            .mark_connected(remote.local, Some(&addr.without_peer()));
        remote
            .directory
            .mark_connected(self.shared.local, self.shared.first_listen_addr().as_ref());
        info!("[cn-05] Connected to {} via {}", remote.local.short(), addr);
        Ok(remote.local)
    }

    async fn hang_up(&self, peer: &PeerId) -> Result<(), SwarmError> {
        self.ensure_open()?;
        if let Some(remote) = self.shared.drop_connection(peer) {
            remote.drop_connection(&self.shared.local);
            debug!("[cn-05] Hung up on {}", peer.short());
        }
        Ok(())
    }

    fn connected_peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<PeerId> = self
            .shared
            .connections
            .lock()
            .iter()
            .filter(|(_, w)| w.upgrade().is_some_and(|r| !r.is_closed()))
            .map(|(peer, _)| *peer)
            .collect();
        peers.sort();
        peers
    }

    fn is_connected(&self, peer: &PeerId) -> bool {
        self.shared.remote(peer).is_some()
    }

    async fn ping(&self, peer: &PeerId) -> Result<Duration, SwarmError> {
        self.ensure_open()?;
        let started = Instant::now();
        if self.shared.remote(peer).is_none() {
            return Err(SwarmError::NotConnected(*peer));
        }
        tokio::task::yield_now().await;
        let rtt = started.elapsed();
        self.shared.directory.record_latency(peer, rtt);
        Ok(rtt)
    }

    fn register_protocol(
        &self,
        protocol: &str,
        handler: Arc<dyn ProtocolHandler>,
    ) -> Result<(), SwarmError> {
        self.ensure_open()?;
        let mut protocols = self.shared.protocols.write();
        if protocols.contains_key(protocol) {
            return Err(SwarmError::ProtocolInUse(protocol.to_string()));
        }
        protocols.insert(protocol.to_string(), handler);
        Ok(())
    }

    fn unregister_protocol(&self, protocol: &str) -> bool {
        self.shared.protocols.write().remove(protocol).is_some()
    }

    async fn request(
        &self,
        peer: &PeerId,
        protocol: &str,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, SwarmError> {
        self.ensure_open()?;
        let remote = self
            .shared
            .remote(peer)
            .ok_or(SwarmError::NotConnected(*peer))?;
        let handler = remote
            .protocols
            .read()
            .get(protocol)
            .cloned()
            .ok_or_else(|| SwarmError::UnknownProtocol(protocol.to_string()))?;

        tokio::time::timeout(
            self.shared.config.request_timeout,
            handler.handle(self.shared.local, payload),
        )
        .await
        .map_err(|_| SwarmError::Timeout)?
    }

    async fn close(&self) -> Result<(), SwarmError> {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let ports: Vec<u64> = self
            .shared
            .listening
            .lock()
            .drain(..)
            .map(|(port, _)| port)
            .collect();
        for port in ports {
            self.shared.network.unbind(port);
        }

        let peers: Vec<PeerId> = self.shared.connections.lock().keys().copied().collect();
        for peer in &peers {
            if let Some(remote) = self.shared.drop_connection(peer) {
                remote.drop_connection(&self.shared.local);
            }
        }
        self.shared.protocols.write().clear();

        info!(
            "[cn-05] Swarm {} closed ({} connections dropped)",
            self.shared.local.short(),
            peers.len()
        );
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}
