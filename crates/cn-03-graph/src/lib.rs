//! # Graph (cn-03)
//!
//! Linked-data layer over the block store.
//!
//! - [`DagNode`]: payload bytes plus named links to other blocks, bincode
//!   encoded under [`Codec::DagNode`](shared_types::Codec::DagNode).
//! - [`GraphResolver`]: walks `<cid>/seg/seg` paths one link at a time.
//! - [`ObjectStore`]: create, inspect and patch individual nodes.
//! - [`FileLayout`]: chunk byte streams into balanced trees of raw leaves
//!   and lay out directories as nodes of named links.
//!
//! Every operation goes through [`BlockStore::get`](cn_02_block_store::BlockStore::get),
//! so the same calls work offline (local blocks only) and online (misses
//! fetched from peers).

pub mod domain;
pub mod service;

#[cfg(test)]
mod test_utils;

pub use domain::errors::GraphError;
pub use domain::node::{DagLink, DagNode, NodeStat};
pub use domain::unixfs::{FileMeta, NodeKind};
pub use service::files::{AddEntry, AddedEntry, FileLayout, GetEntry, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_LINKS};
pub use service::object::{ObjectStore, ObjectTemplate};
pub use service::resolver::{parse_path, GraphResolver};
