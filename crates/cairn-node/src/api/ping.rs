//! Round-trip pings to connected peers.

use std::sync::Arc;
use std::time::Duration;

use shared_types::PeerId;
use tracing::debug;

use super::online;
use crate::error::{NodeError, Result};
use crate::lifecycle::LifecycleController;

/// Outcome of one ping attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingReply {
    /// Attempt number, from 1.
    pub seq: u32,
    pub success: bool,
    pub time: Option<Duration>,
    pub text: String,
}

#[derive(Clone)]
pub struct PingApi {
    lifecycle: Arc<LifecycleController>,
}

impl PingApi {
    pub(crate) fn new(lifecycle: Arc<LifecycleController>) -> Self {
        Self { lifecycle }
    }

    /// Ping `peer` `count` times, dialing a known address first if needed.
    ///
    /// Failed attempts are reported in the replies, not as an error.
    pub async fn ping(&self, peer: &PeerId, count: u32) -> Result<Vec<PingReply>> {
        if count == 0 {
            return Err(NodeError::InvalidInput("ping count must be positive".to_string()));
        }
        let session = online(&self.lifecycle)?;
        let swarm = session.swarm();

        if !swarm.is_connected(peer) {
            let addrs = session
                .directory()
                .get(peer)
                .map(|info| info.dialable_addrs())
                .unwrap_or_default();
            if addrs.is_empty() {
                return Err(NodeError::NotFound(format!("no address for peer {peer}")));
            }
            let mut last_error = None;
            for addr in &addrs {
                match swarm.dial(addr).await {
                    Ok(_) => {
                        last_error = None;
                        break;
                    }
                    Err(e) => last_error = Some(e),
                }
            }
            if let Some(e) = last_error {
                return Err(e.into());
            }
        }

        let mut replies = Vec::with_capacity(count as usize);
        for seq in 1..=count {
            let reply = match swarm.ping(peer).await {
                Ok(time) => PingReply {
                    seq,
                    success: true,
                    time: Some(time),
                    text: String::new(),
                },
                Err(e) => PingReply {
                    seq,
                    success: false,
                    time: None,
                    text: e.to_string(),
                },
            };
            debug!("[Ping] {} seq={} ok={}", peer.short(), seq, reply.success);
            replies.push(reply);
        }
        Ok(replies)
    }
}
