//! # Cairn Benchmarks
//!
//! Criterion benchmarks per subsystem, registered from `benches/`.

pub mod block_store;
pub mod graph;

use std::sync::Arc;

use cn_01_repository::Repository;
use cn_02_block_store::{BlockCache, BlockStore};
use tokio::runtime::Runtime;

/// Runtime for driving async subsystems from criterion closures.
pub fn bench_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("benchmark runtime")
}

/// `len` random bytes.
pub fn random_payload(len: usize) -> Vec<u8> {
    use rand::RngCore;
    let mut data = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut data);
    data
}

/// Block store over an open in-memory repository.
pub fn open_store(rt: &Runtime, cache_capacity: Option<usize>) -> Arc<BlockStore> {
    let repo = Arc::new(Repository::in_memory());
    rt.block_on(repo.open()).expect("in-memory repository opens");
    Arc::new(BlockStore::with_cache_capacity(
        repo,
        cache_capacity.unwrap_or(BlockCache::DEFAULT_CAPACITY),
    ))
}
