//! # Integration Flows
//!
//! Every test here drives one or more [`cairn_node::Node`]s through the
//! public facade only. Nodes that must see each other share one
//! [`cn_05_swarm::MemoryNetwork`] passed in as their transport.

mod exchange_flows;
mod lifecycle_flows;
mod setup_flows;

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;
    use std::time::Duration;

    use cairn_node::{InitOptions, Node};
    use cn_01_repository::Repository;
    use cn_04_peers::MIN_KEY_BITS;
    use cn_05_swarm::MemoryNetwork;

    pub fn fast_init() -> InitOptions {
        InitOptions::default().with_bits(MIN_KEY_BITS)
    }

    /// Initialized in-memory node on `network`.
    pub async fn node_on(network: &MemoryNetwork, fetch_timeout: Duration) -> Node {
        let node = Node::builder()
            .repo_handle(Arc::new(Repository::in_memory()))
            .transport(Arc::new(network.clone()))
            .fetch_timeout(fetch_timeout)
            .rebroadcast_interval(Duration::from_millis(20))
            .build();
        node.init(fast_init()).await.unwrap();
        node
    }
}
