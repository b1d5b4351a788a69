//! # Ports
//!
//! A [`Transport`] is owned by the node for its whole life and asked for a
//! fresh [`Swarm`] on every online transition. The swarm is closed exactly
//! once when the session ends.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cn_04_peers::{PeerDirectory, PeerIdentity};
use shared_types::{PeerAddr, PeerId};

use crate::domain::config::SwarmConfig;
use crate::domain::errors::SwarmError;

/// Serves inbound requests for one protocol.
#[async_trait]
pub trait ProtocolHandler: Send + Sync {
    async fn handle(&self, from: PeerId, payload: Vec<u8>) -> Result<Vec<u8>, SwarmError>;
}

/// Builds swarms.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Swarm bound to `identity` that reports peer state into `directory`.
    async fn create_swarm(
        &self,
        identity: Arc<PeerIdentity>,
        directory: Arc<PeerDirectory>,
        config: SwarmConfig,
    ) -> Result<Arc<dyn Swarm>, SwarmError>;
}

/// Managed set of connections for one online session.
#[async_trait]
pub trait Swarm: Send + Sync {
    fn local_peer_id(&self) -> PeerId;

    /// Start listening. Returns the bound addresses (ports resolved).
    async fn listen(&self, addrs: &[PeerAddr]) -> Result<Vec<PeerAddr>, SwarmError>;

    fn listen_addrs(&self) -> Vec<PeerAddr>;

    /// Connect to `addr`. Returns the remote peer id.
    async fn dial(&self, addr: &PeerAddr) -> Result<PeerId, SwarmError>;

    /// Drop the connection to `peer`, if any.
    async fn hang_up(&self, peer: &PeerId) -> Result<(), SwarmError>;

    fn connected_peers(&self) -> Vec<PeerId>;

    fn is_connected(&self, peer: &PeerId) -> bool;

    /// Round trip to a connected peer.
    async fn ping(&self, peer: &PeerId) -> Result<Duration, SwarmError>;

    fn register_protocol(
        &self,
        protocol: &str,
        handler: Arc<dyn ProtocolHandler>,
    ) -> Result<(), SwarmError>;

    /// Returns whether a handler was removed.
    fn unregister_protocol(&self, protocol: &str) -> bool;

    /// Send `payload` to `peer` on `protocol` and wait for the response.
    async fn request(
        &self,
        peer: &PeerId,
        protocol: &str,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, SwarmError>;

    /// Drop every connection and listener. Idempotent.
    async fn close(&self) -> Result<(), SwarmError>;

    fn is_closed(&self) -> bool;
}
