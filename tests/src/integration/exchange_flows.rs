//! # Exchange Flows
//!
//! Blocks moving between nodes that share one in-process network.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cn_03_graph::AddEntry;
    use cn_05_swarm::MemoryNetwork;

    use crate::integration::fixtures::node_on;

    const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn test_block_fetched_from_connected_peer() {
        let network = MemoryNetwork::new();
        let provider = node_on(&network, FETCH_TIMEOUT).await;
        let seeker = node_on(&network, FETCH_TIMEOUT).await;
        let cid = provider
            .block()
            .put_data(b"shared across the swarm".to_vec())
            .await
            .unwrap();

        provider.go_online().await.unwrap();
        seeker.go_online().await.unwrap();
        let provider_addr = provider.identity().id().await.unwrap().addresses[0].clone();
        let provider_id = seeker.swarm().connect(&provider_addr).await.unwrap();

        let block = seeker.block().get(&cid).await.unwrap();
        assert_eq!(block.data(), b"shared across the swarm");
        assert_eq!(seeker.exchange().stat().unwrap().blocks_received, 1);
        assert_eq!(provider.exchange().stat().unwrap().blocks_sent, 1);
        assert!(seeker
            .swarm()
            .peers()
            .unwrap()
            .iter()
            .any(|peer| peer.peer_id == provider_id));

        provider.go_offline().await.unwrap();
        seeker.go_offline().await.unwrap();
        assert_eq!(seeker.block().get(&cid).await.unwrap(), block);
    }

    #[tokio::test]
    async fn test_file_tree_fetched_through_graph() {
        let network = MemoryNetwork::new();
        let provider = node_on(&network, FETCH_TIMEOUT).await;
        let seeker = node_on(&network, FETCH_TIMEOUT).await;
        let added = provider
            .files()
            .add(vec![
                AddEntry::file("site/index.html", b"<h1>cairn</h1>".to_vec()),
                AddEntry::file("site/about.txt", b"about".to_vec()),
            ])
            .await
            .unwrap();
        let root = added.last().unwrap().cid;

        provider.go_online().await.unwrap();
        seeker.go_online().await.unwrap();
        let provider_addr = provider.identity().id().await.unwrap().addresses[0].clone();
        seeker.swarm().connect(&provider_addr).await.unwrap();

        let page = seeker
            .files()
            .cat(&format!("/ipfs/{root}/index.html"))
            .await
            .unwrap();
        assert_eq!(page, b"<h1>cairn</h1>");
    }

    #[tokio::test]
    async fn test_bootstrap_peer_dialed_on_go_online() {
        let network = MemoryNetwork::new();
        let provider = node_on(&network, FETCH_TIMEOUT).await;
        let joiner = node_on(&network, FETCH_TIMEOUT).await;
        provider.go_online().await.unwrap();
        let provider_info = provider.identity().id().await.unwrap();

        joiner
            .bootstrap()
            .add(provider_info.addresses[0].clone())
            .await
            .unwrap();
        joiner.go_online().await.unwrap();

        let peers = joiner.swarm().peers().unwrap();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].peer_id, provider_info.id);
    }

    #[tokio::test]
    async fn test_ping_and_disconnect() {
        let network = MemoryNetwork::new();
        let target = node_on(&network, FETCH_TIMEOUT).await;
        let pinger = node_on(&network, FETCH_TIMEOUT).await;
        target.go_online().await.unwrap();
        pinger.go_online().await.unwrap();
        let target_info = target.identity().id().await.unwrap();
        pinger.swarm().connect(&target_info.addresses[0]).await.unwrap();

        let replies = pinger.ping().ping(&target_info.id, 3).await.unwrap();
        assert_eq!(replies.len(), 3);
        assert!(replies.iter().all(|reply| reply.success && reply.time.is_some()));

        pinger
            .swarm()
            .disconnect(&target_info.addresses[0])
            .await
            .unwrap();
        assert!(pinger.swarm().peers().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_provider_times_out() {
        let network = MemoryNetwork::new();
        let lonely = node_on(&network, Duration::from_millis(150)).await;
        let other = node_on(&network, Duration::from_millis(150)).await;
        lonely.go_online().await.unwrap();
        other.go_online().await.unwrap();
        let other_addr = other.identity().id().await.unwrap().addresses[0].clone();
        lonely.swarm().connect(&other_addr).await.unwrap();

        let missing = shared_types::ContentId::for_data(shared_types::Codec::Raw, b"absent");
        let result = lonely.block().get(&missing).await;
        assert!(matches!(result, Err(cairn_node::NodeError::Timeout(_))));
        assert!(lonely.exchange().wantlist().unwrap().is_empty());
    }
}
