//! Lifecycle states.

use std::fmt;

/// Coarse network status of the node.
///
/// ```text
/// Offline ──go_online──→ Starting ──ok──→ Online
///    ↑                      │               │
///    └──────── failed ──────┘           go_offline
///    ↑                                      ↓
///    └────────────────────────────────── Stopping
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Offline,
    Starting,
    Online,
    Stopping,
}

impl LifecycleState {
    /// True while a transition is in flight.
    pub fn is_transitioning(self) -> bool {
        matches!(self, LifecycleState::Starting | LifecycleState::Stopping)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Offline => "offline",
            LifecycleState::Starting => "starting",
            LifecycleState::Online => "online",
            LifecycleState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}
