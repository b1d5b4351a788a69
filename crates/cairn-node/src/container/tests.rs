//! # Node Facade Tests

use super::*;
use crate::error::NodeError;
use cn_03_graph::{AddEntry, ObjectTemplate};
use cn_04_peers::MIN_KEY_BITS;
use serde_json::json;
use shared_types::Block;

fn fast_init() -> InitOptions {
    InitOptions::default().with_bits(MIN_KEY_BITS)
}

async fn ready_node() -> Node {
    let node = Node::new(NodeConfig::in_memory());
    node.init(fast_init()).await.unwrap();
    node.load().await.unwrap();
    node
}

#[tokio::test]
async fn test_identity_offline_and_online() {
    let node = ready_node().await;
    let offline = node.identity().id().await.unwrap();
    assert!(offline.addresses.is_empty());
    assert_eq!(offline.public_key.len(), 64);
    assert!(offline.agent_version.starts_with("cairn/"));

    node.go_online().await.unwrap();
    let online = node.identity().id().await.unwrap();
    assert_eq!(online.id, offline.id);
    assert_eq!(online.addresses.len(), 1);
    assert_eq!(online.addresses[0].peer(), Some(&online.id));

    assert_eq!(node.identity().version().repo, cn_01_repository::REPO_VERSION);
}

#[tokio::test]
async fn test_init_while_online_is_busy() {
    let node = ready_node().await;
    node.go_online().await.unwrap();
    assert!(matches!(
        node.init(fast_init().force()).await,
        Err(NodeError::Busy(_))
    ));
    node.go_offline().await.unwrap();
    node.init(fast_init().force()).await.unwrap();
}

#[tokio::test]
async fn test_forced_reinit_replaces_identity() {
    let node = ready_node().await;
    let old = node.identity().id().await.unwrap().id;

    assert_eq!(
        node.init(fast_init()).await.unwrap_err(),
        NodeError::AlreadyInitialized
    );
    let new = node.init(fast_init().force()).await.unwrap();
    assert_ne!(old, new);
    node.load().await.unwrap();
    assert_eq!(node.identity().id().await.unwrap().id, new);
}

#[tokio::test]
async fn test_forced_reinit_forgets_cached_blocks() {
    let node = ready_node().await;
    let block = Block::new(b"old data".to_vec());
    let cid = node.block().put(block).await.unwrap();
    assert!(node.block().get(&cid).await.is_ok());

    node.init(fast_init().force()).await.unwrap();

    assert_eq!(node.repo().stat().await.unwrap().num_objects, 0);
    assert!(node.block().get(&cid).await.unwrap_err().is_not_found());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_init_racing_go_online_keeps_one_identity() {
    let node = Arc::new(ready_node().await);

    for round in 0..20 {
        let reinit = {
            let node = Arc::clone(&node);
            tokio::spawn(async move { node.init(fast_init().force()).await })
        };
        if round % 2 == 0 {
            tokio::task::yield_now().await;
        }
        let online = node.go_online().await;
        let reinit = reinit.await.unwrap();
        assert!(online.is_err() || reinit.is_err());

        if online.is_ok() {
            node.load().await.unwrap();
            let session = node.lifecycle().session().unwrap();
            let loaded = node.setup.loaded().unwrap();
            assert_eq!(session.swarm().local_peer_id(), loaded.identity.peer_id());
            node.go_offline().await.unwrap();
        }
    }
}

#[tokio::test]
async fn test_config_get_set() {
    let node = ready_node().await;
    let config = node.config();

    assert_eq!(
        config.get("Exchange.FetchTimeoutMs").await.unwrap(),
        json!(30_000)
    );
    config.set("Exchange.FetchTimeoutMs", json!(500)).await.unwrap();
    assert_eq!(config.get("Exchange.FetchTimeoutMs").await.unwrap(), json!(500));
    assert_eq!(config.show().await.unwrap().exchange.fetch_timeout_ms, 500);

    assert!(matches!(
        config.get("Nope.Missing").await,
        Err(NodeError::NotFound(_))
    ));
    assert!(matches!(
        config.set("Exchange.FetchTimeoutMs", json!("soon")).await,
        Err(NodeError::Config(_))
    ));
    assert!(matches!(
        config.set("Identity.PeerID", json!("someone-else")).await,
        Err(NodeError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_config_replace_keeps_identity() {
    let node = ready_node().await;
    let mut replacement = node.config().show().await.unwrap();
    let identity = replacement.identity.clone();
    replacement.identity.priv_key = "00".repeat(32);
    replacement.swarm.connection_limit = 3;

    node.config().replace(replacement).await.unwrap();
    let stored = node.config().show().await.unwrap();
    assert_eq!(stored.identity, identity);
    assert_eq!(stored.swarm.connection_limit, 3);
}

#[tokio::test]
async fn test_bootstrap_list_editing() {
    let default: PeerAddr = format!("/memory/7/p2p/{}", "ab".repeat(32)).parse().unwrap();
    let node = Node::builder()
        .repo_handle(Arc::new(Repository::in_memory()))
        .default_bootstrap(vec![default.clone()])
        .build();
    node.init(fast_init()).await.unwrap();
    let bootstrap = node.bootstrap();

    assert!(bootstrap.list().await.unwrap().is_empty());
    assert_eq!(bootstrap.add_defaults().await.unwrap(), vec![default.clone()]);
    assert!(bootstrap.add_defaults().await.unwrap().is_empty());

    let extra: PeerAddr = format!("/memory/8/p2p/{}", "cd".repeat(32)).parse().unwrap();
    bootstrap.add(extra.clone()).await.unwrap();
    assert_eq!(
        bootstrap.list().await.unwrap(),
        vec![default.clone(), extra.clone()]
    );
    assert!(matches!(
        bootstrap.add("/memory/9".parse().unwrap()).await,
        Err(NodeError::InvalidInput(_))
    ));

    assert_eq!(bootstrap.rm(&default).await.unwrap(), vec![default]);
    assert_eq!(bootstrap.rm_all().await.unwrap(), vec![extra]);
    assert!(bootstrap.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_block_api_same_shape_online_and_offline() {
    let node = ready_node().await;
    let block = node.block();

    let cid = block.put_data(b"payload".to_vec()).await.unwrap();
    assert_eq!(block.get(&cid).await.unwrap().data(), b"payload");
    assert_eq!(block.stat(&cid).await.unwrap().size, 7);

    node.go_online().await.unwrap();
    assert_eq!(block.get(&cid).await.unwrap().data(), b"payload");
    node.go_offline().await.unwrap();

    block.rm(&cid).await.unwrap();
    assert!(block.get(&cid).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_block_put_mismatch_leaves_store_untouched() {
    let node = ready_node().await;
    let honest = Block::new(b"honest".to_vec());
    let forged = Block::from_parts(*honest.cid(), b"forged".to_vec());

    assert!(matches!(
        node.block().put(forged).await,
        Err(NodeError::IdentityMismatch { .. })
    ));
    assert_eq!(node.repo().stat().await.unwrap().num_objects, 0);
}

#[tokio::test]
async fn test_object_graph_and_files() {
    let node = ready_node().await;
    let leaf = node.block().put_data(b"leaf".to_vec()).await.unwrap();

    let objects = node.object();
    let base = objects.new_object(ObjectTemplate::Empty).await.unwrap();
    let parent = objects.patch_add_link(&base, "child", &leaf).await.unwrap();
    assert_eq!(
        node.graph().resolve(&format!("/ipfs/{parent}/child")).await.unwrap(),
        leaf
    );
    assert!(node
        .graph()
        .resolve(&format!("{parent}/missing"))
        .await
        .unwrap_err()
        .is_not_found());

    let added = node
        .files()
        .add(vec![AddEntry::file("docs/readme.txt", b"read me".to_vec())])
        .await
        .unwrap();
    let root = added.last().unwrap();
    assert_eq!(root.path, "docs");
    assert_eq!(
        node.files()
            .cat(&format!("{}/readme.txt", root.cid))
            .await
            .unwrap(),
        b"read me"
    );
}

#[tokio::test]
async fn test_network_apis_require_online() {
    let node = ready_node().await;
    assert_eq!(node.swarm().peers().unwrap_err(), NodeError::Offline);
    assert_eq!(node.swarm().local_addrs().unwrap_err(), NodeError::Offline);
    assert_eq!(node.exchange().wantlist().unwrap_err(), NodeError::Offline);

    node.go_online().await.unwrap();
    assert!(node.swarm().peers().unwrap().is_empty());
    assert_eq!(node.swarm().local_addrs().unwrap().len(), 1);
    assert!(node.exchange().wantlist().unwrap().is_empty());
    assert_eq!(node.exchange().stat().unwrap().blocks_received, 0);
}

#[tokio::test]
async fn test_repo_stat_counts_blocks() {
    let node = ready_node().await;
    node.block().put_data(b"one".to_vec()).await.unwrap();
    node.block().put_data(b"three".to_vec()).await.unwrap();

    let stat = node.repo().stat().await.unwrap();
    assert_eq!(stat.num_objects, 2);
    assert_eq!(stat.repo_size, 8);
    assert!(node.repo().path().is_none());
}

#[tokio::test]
async fn test_filesystem_node_reloads_identity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repo");

    let first = Node::builder().repo_path(&path).build();
    let id = first.init(fast_init()).await.unwrap();
    let cid = first.block().put_data(b"persisted".to_vec()).await.unwrap();
    first.shutdown().await.unwrap();

    let second = Node::builder().repo_path(&path).build();
    second.load().await.unwrap();
    assert_eq!(second.identity().id().await.unwrap().id, id);
    assert_eq!(second.block().get(&cid).await.unwrap().data(), b"persisted");
    assert_eq!(second.repo().path(), Some(path));
}

#[tokio::test]
async fn test_load_uninitialized_repository() {
    let node = Node::new(NodeConfig::in_memory());
    assert_eq!(node.load().await.unwrap_err(), NodeError::NotInitialized);
    assert_eq!(node.go_online().await.unwrap_err(), NodeError::NotInitialized);
    assert!(!node.is_online());
}
