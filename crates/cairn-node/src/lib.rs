//! # Cairn Node
//!
//! Composition and lifecycle core of a content-addressed storage node.
//! The `cairn-node` binary is a thin runner over this library.
//!
//! ## Layout
//!
//! - [`container`]: builds every long-lived component once and hands out sub-APIs
//! - [`setup`]: `init` and `load` of the node identity and config
//! - [`lifecycle`]: the online/offline state machine and its sessions
//! - [`api`]: sub-API handles (block, object, files, swarm, ...)
//! - [`error`]: the node-level error type
//! - [`telemetry`]: logging setup
//!
//! ```no_run
//! use cairn_node::{InitOptions, Node, NodeConfig};
//!
//! # async fn run() -> cairn_node::Result<()> {
//! let node = Node::new(NodeConfig::in_memory());
//! node.init(InitOptions::default()).await?;
//! node.go_online().await?;
//! let cid = node.block().put_data(b"hello".to_vec()).await?;
//! assert_eq!(node.block().get(&cid).await?.data(), b"hello");
//! node.shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![allow(clippy::type_complexity)]

pub mod api;
pub mod container;
pub mod error;
pub mod lifecycle;
pub mod setup;
pub mod telemetry;

pub use api::{
    BlockApi, BootstrapApi, ConfigApi, ExchangeApi, FilesApi, GraphApi, IdentityApi,
    IdentityInfo, ObjectApi, PingApi, PingReply, RepoApi, SwarmApi, VersionInfo,
};
pub use container::{default_repo_path, Node, NodeBuilder, NodeConfig, RepoSource};
pub use error::{BootstrapStage, NodeError, Result};
pub use lifecycle::{LifecycleController, LifecycleState, NetworkState, OnlineSession};
pub use setup::{InitOptions, LoadedRepo};

pub use cn_02_block_store::GetOptions;
pub use tokio_util::sync::CancellationToken;
