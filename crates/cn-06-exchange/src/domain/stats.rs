//! Exchange counters.

use std::sync::atomic::{AtomicU64, Ordering};

use shared_types::{ContentId, PeerId};

/// Snapshot returned by [`ExchangeService::stat`](crate::ExchangeService::stat).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExchangeStat {
    pub blocks_received: u64,
    pub data_received: u64,
    pub blocks_sent: u64,
    pub data_sent: u64,
    /// Peer replies that failed verification.
    pub invalid_blocks: u64,
    pub wantlist: Vec<ContentId>,
    pub peers: Vec<PeerId>,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    blocks_received: AtomicU64,
    data_received: AtomicU64,
    blocks_sent: AtomicU64,
    data_sent: AtomicU64,
    invalid_blocks: AtomicU64,
}

impl Counters {
    pub(crate) fn received(&self, bytes: usize) {
        self.blocks_received.fetch_add(1, Ordering::Relaxed);
        self.data_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn sent(&self, bytes: usize) {
        self.blocks_sent.fetch_add(1, Ordering::Relaxed);
        self.data_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn invalid(&self) {
        self.invalid_blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, wantlist: Vec<ContentId>, peers: Vec<PeerId>) -> ExchangeStat {
        ExchangeStat {
            blocks_received: self.blocks_received.load(Ordering::Relaxed),
            data_received: self.data_received.load(Ordering::Relaxed),
            blocks_sent: self.blocks_sent.load(Ordering::Relaxed),
            data_sent: self.data_sent.load(Ordering::Relaxed),
            invalid_blocks: self.invalid_blocks.load(Ordering::Relaxed),
            wantlist,
            peers,
        }
    }
}
