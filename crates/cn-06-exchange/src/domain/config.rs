//! Exchange tuning.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Fetch timeout applied when the caller gives none.
    pub fetch_timeout: Duration,
    /// Pause between rounds of asking connected peers.
    pub rebroadcast_interval: Duration,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            rebroadcast_interval: Duration::from_secs(1),
        }
    }
}
