//! # Setup Flows
//!
//! `init` and `load` through the node facade, in memory and on disk.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cairn_node::{Node, NodeConfig, NodeError};
    use cn_05_swarm::MemoryNetwork;

    use crate::integration::fixtures::{fast_init, node_on};

    #[tokio::test]
    async fn test_init_twice_needs_empty_repo() {
        let node = node_on(&MemoryNetwork::new(), Duration::from_secs(5)).await;
        let first = node.identity().id().await.unwrap().id;

        assert_eq!(
            node.init(fast_init()).await.unwrap_err(),
            NodeError::AlreadyInitialized
        );
        assert_eq!(node.identity().id().await.unwrap().id, first);
    }

    #[tokio::test]
    async fn test_empty_repo_wipes_blocks_and_identity() {
        let node = node_on(&MemoryNetwork::new(), Duration::from_secs(5)).await;
        let first = node.identity().id().await.unwrap().id;
        let cid = node.block().put_data(b"old data".to_vec()).await.unwrap();

        let second = node.init(fast_init().force()).await.unwrap();
        assert_ne!(first, second);
        assert!(node.block().get(&cid).await.unwrap_err().is_not_found());
        assert_eq!(node.repo().stat().await.unwrap().num_objects, 0);

        node.go_online().await.unwrap();
        assert_eq!(node.identity().id().await.unwrap().id, second);
    }

    #[tokio::test]
    async fn test_uninitialized_node_refuses_to_start() {
        let node = Node::new(NodeConfig::in_memory());
        assert_eq!(node.load().await.unwrap_err(), NodeError::NotInitialized);
        assert_eq!(node.go_online().await.unwrap_err(), NodeError::NotInitialized);
        assert!(!node.is_online());

        node.init(fast_init()).await.unwrap();
        node.go_online().await.unwrap();
        assert!(node.is_online());
    }

    #[tokio::test]
    async fn test_on_disk_repository_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node");

        let first = Node::builder().repo_path(&path).build();
        let id = first.init(fast_init()).await.unwrap();
        first
            .config()
            .set("Swarm.ConnectionLimit", serde_json::json!(7))
            .await
            .unwrap();
        let cid = first.block().put_data(b"kept".to_vec()).await.unwrap();
        first.go_online().await.unwrap();
        first.shutdown().await.unwrap();

        let second = Node::builder().repo_path(&path).build();
        second.load().await.unwrap();
        assert_eq!(second.identity().id().await.unwrap().id, id);
        assert_eq!(second.config().show().await.unwrap().swarm.connection_limit, 7);
        assert_eq!(second.block().get(&cid).await.unwrap().data(), b"kept");
        second.shutdown().await.unwrap();
    }
}
