//! Shared fixtures for graph tests.

use std::sync::Arc;

use cn_01_repository::Repository;
use cn_02_block_store::BlockStore;

/// Block store over an open in-memory repository.
pub async fn open_store() -> Arc<BlockStore> {
    let repo = Arc::new(Repository::in_memory());
    repo.open().await.expect("in-memory repo opens");
    Arc::new(BlockStore::new(repo))
}
