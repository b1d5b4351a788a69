//! # Block Store Tests

use super::*;
use async_trait::async_trait;
use shared_types::Codec;
use std::time::Duration;

async fn open_store() -> BlockStore {
    let repo = Arc::new(Repository::in_memory());
    repo.open().await.unwrap();
    BlockStore::new(repo)
}

/// Exchange double serving a fixed set of blocks.
#[derive(Default)]
struct StubExchange {
    blocks: Mutex<Vec<Block>>,
    added: Mutex<Vec<ContentId>>,
    lie: bool,
}

#[async_trait]
impl ExchangeHook for StubExchange {
    async fn fetch(&self, cid: &ContentId, options: GetOptions) -> Result<Block, BlockError> {
        if self.lie {
            return Ok(Block::from_parts(*cid, b"forged".to_vec()));
        }
        if let Some(block) = self.blocks.lock().iter().find(|b| b.cid() == cid) {
            return Ok(block.clone());
        }
        match options.cancel {
            Some(token) => {
                token.cancelled().await;
                Err(BlockError::Cancelled(*cid))
            }
            None => Err(BlockError::Timeout(*cid)),
        }
    }

    fn block_added(&self, block: &Block) {
        self.added.lock().push(*block.cid());
    }
}

#[tokio::test]
async fn test_put_then_get_local() {
    let store = open_store().await;
    let block = Block::new(b"hello".to_vec());

    let cid = store.put(block.clone()).await.unwrap();
    assert_eq!(cid, *block.cid());
    assert_eq!(store.get(&cid).await.unwrap(), block);
    assert!(store.has(&cid).await.unwrap());
}

#[tokio::test]
async fn test_put_is_idempotent() {
    let store = open_store().await;
    let block = Block::new(b"twice".to_vec());

    store.put(block.clone()).await.unwrap();
    store.put(block.clone()).await.unwrap();
    assert_eq!(store.list().await.unwrap(), vec![*block.cid()]);
}

#[tokio::test]
async fn test_put_rejects_identity_mismatch_without_mutation() {
    let store = open_store().await;
    let honest = Block::new(b"real".to_vec());
    let forged = Block::from_parts(*honest.cid(), b"fake".to_vec());

    let err = store.put(forged).await.unwrap_err();
    assert!(matches!(err, BlockError::IdentityMismatch { .. }));
    assert!(!store.has(honest.cid()).await.unwrap());
    assert_eq!(store.cached_len(), 0);
}

#[tokio::test]
async fn test_get_without_exchange_is_not_found() {
    let store = open_store().await;
    let cid = ContentId::for_data(Codec::Raw, b"absent");
    assert_eq!(store.get(&cid).await, Err(BlockError::NotFound(cid)));
}

#[tokio::test]
async fn test_get_falls_back_to_exchange_and_persists() {
    let store = open_store().await;
    let remote = Block::new(b"remote".to_vec());
    let exchange = Arc::new(StubExchange::default());
    exchange.blocks.lock().push(remote.clone());

    let hook: Arc<dyn ExchangeHook> = exchange.clone();
    store.attach_exchange(Arc::downgrade(&hook));

    let got = store.get(remote.cid()).await.unwrap();
    assert_eq!(got, remote);

    store.clear_cache();
    assert!(store.get_local(remote.cid()).await.unwrap().is_some());
}

#[tokio::test]
async fn test_fetched_block_is_verified() {
    let store = open_store().await;
    let exchange: Arc<dyn ExchangeHook> = Arc::new(StubExchange {
        lie: true,
        ..Default::default()
    });
    store.attach_exchange(Arc::downgrade(&exchange));

    let cid = ContentId::for_data(Codec::Raw, b"wanted");
    let err = store.get(&cid).await.unwrap_err();
    assert!(matches!(err, BlockError::IdentityMismatch { claimed, .. } if claimed == cid));
    assert!(!store.has(&cid).await.unwrap());
}

#[tokio::test]
async fn test_put_notifies_exchange() {
    let store = open_store().await;
    let exchange = Arc::new(StubExchange::default());
    let hook: Arc<dyn ExchangeHook> = exchange.clone();
    store.attach_exchange(Arc::downgrade(&hook));

    let cid = store.put(Block::new(b"announce".to_vec())).await.unwrap();
    assert_eq!(*exchange.added.lock(), vec![cid]);
}

#[tokio::test]
async fn test_detached_or_dropped_exchange_is_ignored() {
    let store = open_store().await;
    let cid = ContentId::for_data(Codec::Raw, b"nowhere");

    let hook: Arc<dyn ExchangeHook> = Arc::new(StubExchange::default());
    store.attach_exchange(Arc::downgrade(&hook));
    assert!(store.has_exchange());

    drop(hook);
    assert!(!store.has_exchange());
    assert_eq!(store.get(&cid).await, Err(BlockError::NotFound(cid)));

    let hook: Arc<dyn ExchangeHook> = Arc::new(StubExchange::default());
    store.attach_exchange(Arc::downgrade(&hook));
    store.detach_exchange();
    assert!(!store.has_exchange());
}

#[tokio::test]
async fn test_caller_cancellation_reaches_exchange() {
    let store = Arc::new(open_store().await);
    let hook: Arc<dyn ExchangeHook> = Arc::new(StubExchange::default());
    store.attach_exchange(Arc::downgrade(&hook));

    let cid = ContentId::for_data(Codec::Raw, b"never");
    let token = tokio_util::sync::CancellationToken::new();
    let options = GetOptions::default()
        .with_timeout(Duration::from_secs(60))
        .with_cancel(token.clone());

    let task = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.get_with(&cid, options).await })
    };
    token.cancel();
    assert_eq!(task.await.unwrap(), Err(BlockError::Cancelled(cid)));
}

#[tokio::test]
async fn test_delete_and_stat() {
    let store = open_store().await;
    let cid = store.put(Block::new(b"12345".to_vec())).await.unwrap();

    assert_eq!(store.stat(&cid).await.unwrap().size, 5);
    store.delete(&cid).await.unwrap();
    assert_eq!(store.delete(&cid).await, Err(BlockError::NotFound(cid)));
}

#[tokio::test]
async fn test_closed_repository_surfaces() {
    let repo = Arc::new(Repository::in_memory());
    let store = BlockStore::new(repo);
    let err = store.put(Block::new(b"x".to_vec())).await.unwrap_err();
    assert!(matches!(err, BlockError::Repository(_)));
}

#[tokio::test]
async fn test_repository_wipe_drops_cached_blocks() {
    let store = open_store().await;
    let block = Block::new(b"stale".to_vec());
    store.put(block.clone()).await.unwrap();
    assert_eq!(store.cached_len(), 1);

    store.repository().wipe().await.unwrap();

    assert!(!store.has(block.cid()).await.unwrap());
    assert_eq!(store.get_local(block.cid()).await.unwrap(), None);
    assert_eq!(store.get(block.cid()).await, Err(BlockError::NotFound(*block.cid())));
    assert_eq!(store.cached_len(), 0);
}
