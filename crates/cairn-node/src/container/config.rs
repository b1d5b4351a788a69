//! # Node Configuration
//!
//! Runtime settings supplied by the embedding program. Persisted settings
//! (identity, addresses, bootstrap list) live in the repository's config
//! document instead; see [`cn_01_repository::RepoConfig`].
//!
//! ## Environment
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `CAIRN_PATH` | Repository directory |
//! | `CAIRN_FETCH_TIMEOUT_MS` | Overrides the persisted fetch timeout |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cn_01_repository::Repository;
use cn_02_block_store::BlockCache;
use shared_types::PeerAddr;
use tracing::warn;

/// Environment variable naming the repository directory.
pub const PATH_ENV: &str = "CAIRN_PATH";

/// Environment variable overriding the exchange fetch timeout.
pub const FETCH_TIMEOUT_ENV: &str = "CAIRN_FETCH_TIMEOUT_MS";

/// Directory name used under `$HOME` when no path is configured.
pub const DEFAULT_REPO_DIR: &str = ".cairn";

/// Where the node's repository comes from.
#[derive(Clone, Default)]
pub enum RepoSource {
    /// Filesystem repository at this directory.
    Path(PathBuf),
    /// Caller-built repository.
    Handle(Arc<Repository>),
    /// `CAIRN_PATH`, else `$HOME/.cairn`, else `./.cairn`.
    #[default]
    Default,
}

impl RepoSource {
    pub(crate) fn into_repository(self) -> Arc<Repository> {
        match self {
            RepoSource::Path(path) => Arc::new(Repository::at_path(path)),
            RepoSource::Handle(repo) => repo,
            RepoSource::Default => Arc::new(Repository::at_path(default_repo_path())),
        }
    }
}

impl std::fmt::Debug for RepoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            RepoSource::Handle(repo) => f.debug_tuple("Handle").field(repo).finish(),
            RepoSource::Default => f.write_str("Default"),
        }
    }
}

/// Resolve the default repository directory.
pub fn default_repo_path() -> PathBuf {
    if let Some(path) = std::env::var_os(PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    match std::env::var_os("HOME").filter(|h| !h.is_empty()) {
        Some(home) => PathBuf::from(home).join(DEFAULT_REPO_DIR),
        None => PathBuf::from(".").join(DEFAULT_REPO_DIR),
    }
}

/// Runtime node settings.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Repository location.
    pub repo: RepoSource,
    /// Overrides `Exchange.FetchTimeoutMs` from the repository config.
    pub fetch_timeout: Option<Duration>,
    /// Overrides `Exchange.RebroadcastIntervalMs` from the repository config.
    pub rebroadcast_interval: Option<Duration>,
    /// Blocks kept in the block store's memory cache.
    pub block_cache_capacity: usize,
    /// Addresses restored by `bootstrap.add_defaults`.
    pub default_bootstrap: Vec<PeerAddr>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            repo: RepoSource::Default,
            fetch_timeout: None,
            rebroadcast_interval: None,
            block_cache_capacity: BlockCache::DEFAULT_CAPACITY,
            default_bootstrap: Vec::new(),
        }
    }
}

impl NodeConfig {
    /// Defaults overlaid with `CAIRN_PATH` and `CAIRN_FETCH_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = std::env::var_os(PATH_ENV).filter(|p| !p.is_empty()) {
            config.repo = RepoSource::Path(PathBuf::from(path));
        }

        if let Ok(raw) = std::env::var(FETCH_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.fetch_timeout = Some(Duration::from_millis(ms)),
                _ => warn!("Ignoring {}={:?}: not a positive integer", FETCH_TIMEOUT_ENV, raw),
            }
        }

        config
    }

    /// In-memory repository, handy for tests and embedded use.
    pub fn in_memory() -> Self {
        Self {
            repo: RepoSource::Handle(Arc::new(Repository::in_memory())),
            ..Self::default()
        }
    }
}
