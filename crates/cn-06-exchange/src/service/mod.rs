//! # Exchange Service
//!
//! One instance per online session. Wants are shared per content id: the
//! first waiter spawns a task that asks connected peers every rebroadcast
//! interval, later waiters subscribe to the same result. The want is
//! dropped, and its task cancelled, when the last waiter leaves.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use cn_02_block_store::{BlockError, BlockStore, ExchangeHook, GetOptions};
use cn_05_swarm::{ProtocolHandler, Swarm, SwarmError};
use parking_lot::Mutex;
use shared_types::{Block, ContentId, PeerId};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::domain::config::ExchangeConfig;
use crate::domain::errors::ExchangeError;
use crate::domain::messages::{ExchangeRequest, ExchangeResponse, EXCHANGE_PROTOCOL};
use crate::domain::stats::{Counters, ExchangeStat};

struct WantEntry {
    id: u64,
    token: CancellationToken,
    found: watch::Sender<Option<Block>>,
    waiters: usize,
}

struct ExchangeInner {
    swarm: Arc<dyn Swarm>,
    blocks: Arc<BlockStore>,
    config: ExchangeConfig,
    wants: Mutex<HashMap<ContentId, WantEntry>>,
    next_want: AtomicU64,
    shutdown: CancellationToken,
    stopped: AtomicBool,
    counters: Counters,
}

/// Block exchange bound to one swarm and the node's block store.
pub struct ExchangeService {
    inner: Arc<ExchangeInner>,
}

impl ExchangeService {
    /// Register the exchange protocol on `swarm` and start serving.
    pub fn start(
        swarm: Arc<dyn Swarm>,
        blocks: Arc<BlockStore>,
        config: ExchangeConfig,
    ) -> Result<Arc<Self>, ExchangeError> {
        let inner = Arc::new(ExchangeInner {
            swarm,
            blocks,
            config,
            wants: Mutex::new(HashMap::new()),
            next_want: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
            stopped: AtomicBool::new(false),
            counters: Counters::default(),
        });

        let handler = Arc::new(WantHandler {
            inner: Arc::downgrade(&inner),
        });
        inner.swarm.register_protocol(EXCHANGE_PROTOCOL, handler)?;

        info!(
            "[cn-06] Exchange started (timeout {:?}, rebroadcast {:?})",
            inner.config.fetch_timeout, inner.config.rebroadcast_interval
        );
        Ok(Arc::new(Self { inner }))
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.inner.config
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Fetch `cid` from connected peers.
    ///
    /// Resolves with the first verified block, or fails `Timeout` when the
    /// timeout (caller's or configured) expires, or `Cancelled` when the
    /// caller token fires, the want is dropped, or the service stops.
    pub async fn fetch(&self, cid: &ContentId, options: GetOptions) -> Result<Block, ExchangeError> {
        if self.is_stopped() {
            return Err(ExchangeError::Stopped);
        }

        let (id, mut found, want_token) = self.register_want(cid);
        let _guard = WantGuard {
            inner: &self.inner,
            cid: *cid,
            id,
        };

        // A put may have landed between the store miss and the registration.
        if let Some(block) = self.inner.blocks.get_local(cid).await? {
            return Ok(block);
        }

        let timeout = options.timeout.unwrap_or(self.inner.config.fetch_timeout);
        let caller = options.cancel.unwrap_or_default();

        tokio::select! {
            block = wait_found(&mut found) => block.ok_or(ExchangeError::Cancelled),
            _ = want_token.cancelled() => {
                if self.is_stopped() {
                    Err(ExchangeError::Stopped)
                } else {
                    Err(ExchangeError::Cancelled)
                }
            }
            _ = caller.cancelled() => Err(ExchangeError::Cancelled),
            _ = tokio::time::sleep(timeout) => {
                debug!("[cn-06] Want for {} timed out after {:?}", cid, timeout);
                Err(ExchangeError::Timeout)
            }
        }
    }

    fn register_want(
        &self,
        cid: &ContentId,
    ) -> (u64, watch::Receiver<Option<Block>>, CancellationToken) {
        let mut wants = self.inner.wants.lock();
        if let Some(entry) = wants.get_mut(cid) {
            entry.waiters += 1;
            return (entry.id, entry.found.subscribe(), entry.token.clone());
        }

        let id = self.inner.next_want.fetch_add(1, Ordering::Relaxed);
        let token = self.inner.shutdown.child_token();
        let (found, rx) = watch::channel(None);
        wants.insert(
            *cid,
            WantEntry {
                id,
                token: token.clone(),
                found: found.clone(),
                waiters: 1,
            },
        );
        drop(wants);

        trace!("[cn-06] New want {}", cid);
        tokio::spawn(run_want(
            Arc::clone(&self.inner),
            *cid,
            token.clone(),
            found,
        ));
        (id, rx, token)
    }

    /// A block became available locally; resolve any want for it.
    pub fn notify_block(&self, block: &Block) {
        if let Some(entry) = self.inner.wants.lock().get(block.cid()) {
            entry.found.send_replace(Some(block.clone()));
            trace!("[cn-06] Want {} satisfied locally", block.cid());
        }
    }

    /// Ids currently wanted, sorted.
    pub fn wantlist(&self) -> Vec<ContentId> {
        let mut list: Vec<ContentId> = self.inner.wants.lock().keys().copied().collect();
        list.sort();
        list
    }

    /// Drop the want for `cid`; its waiters fail `Cancelled`.
    pub fn unwant(&self, cid: &ContentId) -> bool {
        match self.inner.wants.lock().remove(cid) {
            Some(entry) => {
                entry.token.cancel();
                debug!("[cn-06] Unwanted {}", cid);
                true
            }
            None => false,
        }
    }

    pub fn stat(&self) -> ExchangeStat {
        self.inner
            .counters
            .snapshot(self.wantlist(), self.inner.swarm.connected_peers())
    }

    /// Cancel every want and stop serving. Idempotent.
    pub async fn stop(&self) {
        if self.inner.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.shutdown.cancel();
        let dropped = {
            let mut wants = self.inner.wants.lock();
            let count = wants.len();
            wants.clear();
            count
        };
        self.inner.swarm.unregister_protocol(EXCHANGE_PROTOCOL);
        info!("[cn-06] Exchange stopped ({} wants cancelled)", dropped);
    }
}

#[async_trait]
impl ExchangeHook for ExchangeService {
    async fn fetch(&self, cid: &ContentId, options: GetOptions) -> Result<Block, BlockError> {
        ExchangeService::fetch(self, cid, options)
            .await
            .map_err(|e| e.into_block_error(*cid))
    }

    fn block_added(&self, block: &Block) {
        self.notify_block(block);
    }
}

/// Releases one waiter's hold on a want, including on early drop.
struct WantGuard<'a> {
    inner: &'a Arc<ExchangeInner>,
    cid: ContentId,
    id: u64,
}

impl Drop for WantGuard<'_> {
    fn drop(&mut self) {
        let mut wants = self.inner.wants.lock();
        // The want may have been unwanted and re-registered meanwhile.
        if let Some(entry) = wants.get_mut(&self.cid).filter(|e| e.id == self.id) {
            entry.waiters = entry.waiters.saturating_sub(1);
            if entry.waiters == 0 {
                entry.token.cancel();
                wants.remove(&self.cid);
            }
        }
    }
}

async fn wait_found(found: &mut watch::Receiver<Option<Block>>) -> Option<Block> {
    found
        .wait_for(Option::is_some)
        .await
        .ok()
        .and_then(|block| block.clone())
}

/// Ask connected peers for `cid` until found or cancelled.
async fn run_want(
    inner: Arc<ExchangeInner>,
    cid: ContentId,
    token: CancellationToken,
    found: watch::Sender<Option<Block>>,
) {
    loop {
        if token.is_cancelled() || found.borrow().is_some() {
            return;
        }
        if let Some(block) = query_peers(&inner, &cid, &token).await {
            found.send_replace(Some(block));
            return;
        }
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(inner.config.rebroadcast_interval) => {}
        }
    }
}

async fn query_peers(
    inner: &ExchangeInner,
    cid: &ContentId,
    token: &CancellationToken,
) -> Option<Block> {
    let request = match ExchangeRequest::Want(*cid).encode() {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("[cn-06] Cannot encode want for {}: {}", cid, e);
            return None;
        }
    };

    for peer in inner.swarm.connected_peers() {
        let reply = tokio::select! {
            _ = token.cancelled() => return None,
            reply = inner.swarm.request(&peer, EXCHANGE_PROTOCOL, request.clone()) => reply,
        };
        match reply.map_err(ExchangeError::from).and_then(|b| ExchangeResponse::decode(&b)) {
            Ok(ExchangeResponse::Have { cid: got, data }) => {
                if got == *cid && cid.matches(&data) {
                    inner.counters.received(data.len());
                    debug!("[cn-06] Received {} ({} bytes) from {}", cid, data.len(), peer.short());
                    return Some(Block::from_parts(*cid, data));
                }
                inner.counters.invalid();
                warn!("[cn-06] Peer {} sent a block that does not match {}", peer.short(), cid);
            }
            Ok(ExchangeResponse::DontHave(_)) => {
                trace!("[cn-06] {} does not have {}", peer.short(), cid);
            }
            Err(e) => debug!("[cn-06] Want {} to {} failed: {}", cid, peer.short(), e),
        }
    }
    None
}

/// Serves inbound wants from local blocks.
struct WantHandler {
    inner: Weak<ExchangeInner>,
}

#[async_trait]
impl ProtocolHandler for WantHandler {
    async fn handle(&self, from: PeerId, payload: Vec<u8>) -> Result<Vec<u8>, SwarmError> {
        let inner = self.inner.upgrade().ok_or(SwarmError::Closed)?;
        if inner.stopped.load(Ordering::Acquire) {
            return Err(SwarmError::Closed);
        }

        let ExchangeRequest::Want(cid) =
            ExchangeRequest::decode(&payload).map_err(|e| SwarmError::Remote(e.to_string()))?;

        let response = match inner.blocks.get_local(&cid).await {
            Ok(Some(block)) => {
                inner.counters.sent(block.len());
                trace!("[cn-06] Serving {} to {}", cid, from.short());
                ExchangeResponse::Have {
                    cid,
                    data: block.data().to_vec(),
                }
            }
            Ok(None) => ExchangeResponse::DontHave(cid),
            Err(e) => {
                warn!("[cn-06] Local lookup of {} failed: {}", cid, e);
                ExchangeResponse::DontHave(cid)
            }
        };
        response.encode().map_err(|e| SwarmError::Remote(e.to_string()))
    }
}
