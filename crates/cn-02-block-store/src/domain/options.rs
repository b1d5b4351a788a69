//! Per-call options and block metadata.

use std::time::Duration;

use shared_types::ContentId;
use tokio_util::sync::CancellationToken;

/// Options for a block lookup that may go to the network.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Give up on the network after this long. `None` uses the exchange
    /// default.
    pub timeout: Option<Duration>,
    /// Abandon the lookup when this token fires.
    pub cancel: Option<CancellationToken>,
}

impl GetOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Size of a stored block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockStat {
    pub cid: ContentId,
    pub size: usize,
}
