//! # Sub-APIs
//!
//! Each sub-API is a small handle holding only the components it needs,
//! handed out by [`Node`](crate::Node). Handles are cheap to clone and can
//! be moved into tasks.
//!
//! | Handle | Needs |
//! |--------|-------|
//! | [`IdentityApi`] | setup, lifecycle |
//! | [`RepoApi`] | repository |
//! | [`ConfigApi`], [`BootstrapApi`] | setup |
//! | [`BlockApi`], [`GraphApi`], [`ObjectApi`], [`FilesApi`] | block store |
//! | [`SwarmApi`], [`ExchangeApi`], [`PingApi`] | lifecycle (current session) |
//!
//! Storage and graph handles behave the same online and offline; only the
//! outcome of a local miss differs. Network handles fail
//! [`NodeError::Offline`](crate::NodeError::Offline) without a session.

mod block;
mod bootstrap;
mod config;
mod exchange;
mod files;
mod graph;
mod identity;
mod object;
mod ping;
mod repo;
mod swarm;

pub use block::BlockApi;
pub use bootstrap::BootstrapApi;
pub use config::ConfigApi;
pub use exchange::ExchangeApi;
pub use files::FilesApi;
pub use graph::GraphApi;
pub use identity::{IdentityApi, IdentityInfo, VersionInfo};
pub use object::ObjectApi;
pub use ping::{PingApi, PingReply};
pub use repo::RepoApi;
pub use swarm::SwarmApi;

use std::sync::Arc;

use crate::error::{NodeError, Result};
use crate::lifecycle::{LifecycleController, OnlineSession};

/// Current session or `Offline`.
pub(crate) fn online(lifecycle: &LifecycleController) -> Result<Arc<OnlineSession>> {
    lifecycle.session().ok_or(NodeError::Offline)
}
