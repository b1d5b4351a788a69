//! # Lifecycle Flows
//!
//! Online/offline transitions of whole nodes, including rollback when a
//! node cannot bind its listen address.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use cairn_node::{BootstrapStage, LifecycleState, NodeError};
    use cn_02_block_store::GetOptions;
    use cn_05_swarm::MemoryNetwork;
    use serde_json::json;
    use shared_types::{Codec, ContentId};
    use tokio_util::sync::CancellationToken;

    use crate::integration::fixtures::node_on;

    #[tokio::test]
    async fn test_concurrent_go_online_builds_one_swarm() {
        let network = MemoryNetwork::new();
        let node = Arc::new(node_on(&network, Duration::from_secs(5)).await);

        let calls: Vec<_> = (0..8)
            .map(|_| {
                let node = Arc::clone(&node);
                tokio::spawn(async move { node.go_online().await })
            })
            .collect();
        for call in calls {
            call.await.unwrap().unwrap();
        }

        assert_eq!(node.state(), LifecycleState::Online);
        assert_eq!(node.lifecycle().generation(), 1);
        assert_eq!(network.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_listen_collision_rolls_back_then_retry_succeeds() {
        let network = MemoryNetwork::new();
        let holder = node_on(&network, Duration::from_secs(5)).await;
        let loser = node_on(&network, Duration::from_secs(5)).await;
        for node in [&holder, &loser] {
            node.config()
                .set("Addresses.Swarm", json!(["/memory/4242"]))
                .await
                .unwrap();
        }

        holder.go_online().await.unwrap();
        match loser.go_online().await {
            Err(NodeError::PartialBootstrapFailure { stage, .. }) => {
                assert_eq!(stage, BootstrapStage::Listen)
            }
            other => panic!("expected listen failure, got {other:?}"),
        }
        assert_eq!(loser.state(), LifecycleState::Offline);
        assert!(loser.lifecycle().session().is_none());
        assert_eq!(network.listener_count(), 1);

        holder.go_offline().await.unwrap();
        loser.go_online().await.unwrap();
        assert_eq!(loser.lifecycle().generation(), 1);
        assert_eq!(network.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_online_offline_cycles_advance_generation() {
        let network = MemoryNetwork::new();
        let node = node_on(&network, Duration::from_secs(5)).await;

        for round in 1..=3 {
            node.go_online().await.unwrap();
            assert_eq!(node.lifecycle().generation(), round);
            node.go_offline().await.unwrap();
            assert_eq!(network.listener_count(), 0);
        }
        assert_eq!(node.swarm().peers().unwrap_err(), NodeError::Offline);
    }

    #[tokio::test]
    async fn test_pending_get_cancelled_by_go_offline() {
        let network = MemoryNetwork::new();
        let node = Arc::new(node_on(&network, Duration::from_secs(60)).await);
        node.go_online().await.unwrap();
        let missing = ContentId::for_data(Codec::Raw, b"nobody has this");

        let pending = {
            let node = Arc::clone(&node);
            tokio::spawn(async move { node.block().get(&missing).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(node.exchange().wantlist().unwrap(), vec![missing]);

        node.go_offline().await.unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), pending)
            .await
            .expect("get must resolve once offline")
            .unwrap();
        assert!(matches!(result, Err(NodeError::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_caller_timeout_and_cancel_while_online() {
        let network = MemoryNetwork::new();
        let node = node_on(&network, Duration::from_secs(60)).await;
        node.go_online().await.unwrap();
        let missing = ContentId::for_data(Codec::Raw, b"still nobody");

        let timed = node
            .block()
            .get_with(&missing, GetOptions::default().with_timeout(Duration::from_millis(50)))
            .await;
        assert!(matches!(timed, Err(NodeError::Timeout(_))));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let cancelled = node
            .block()
            .get_with(&missing, GetOptions::default().with_cancel(cancel))
            .await;
        assert!(matches!(cancelled, Err(NodeError::Cancelled(_))));
        assert!(node.exchange().wantlist().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_miss_fails_fast() {
        let node = node_on(&MemoryNetwork::new(), Duration::from_secs(60)).await;
        let missing = ContentId::for_data(Codec::Raw, b"offline miss");

        let result = tokio::time::timeout(Duration::from_secs(1), node.block().get(&missing))
            .await
            .expect("offline miss must not wait");
        assert!(result.unwrap_err().is_not_found());
    }
}
