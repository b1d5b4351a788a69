//! Swarm tuning.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwarmConfig {
    /// Maximum simultaneous connections.
    pub connection_limit: usize,
    /// Upper bound on a single protocol request.
    pub request_timeout: Duration,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            connection_limit: 256,
            request_timeout: Duration::from_secs(10),
        }
    }
}
