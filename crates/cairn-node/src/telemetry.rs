//! # Logging
//!
//! Installs the global `tracing` subscriber. The filter comes from
//! `CAIRN_LOG` when set, otherwise from the level given by the caller.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter directive variable, in `EnvFilter` syntax.
pub const LOG_ENV: &str = "CAIRN_LOG";

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the fmt subscriber.
///
/// Returns `false` when a global subscriber was already installed, which
/// is the normal case inside test binaries.
pub fn init_tracing(default_level: &str) -> bool {
    fmt()
        .with_env_filter(filter(default_level))
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .is_ok()
}
