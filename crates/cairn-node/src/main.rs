//! # Cairn Node Binary
//!
//! Opens (or initializes) the repository named by `CAIRN_PATH`, goes online
//! and serves until Ctrl+C.

use anyhow::{Context, Result};
use tracing::{error, info};

use cairn_node::telemetry::init_tracing;
use cairn_node::{InitOptions, Node, NodeConfig, NodeError};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info");

    let config = NodeConfig::from_env();
    let node = Node::new(config);

    match node.load().await {
        Ok(()) => {}
        Err(NodeError::NotInitialized) => {
            info!("[Node] No repository found, initializing");
            let id = node
                .init(InitOptions::default())
                .await
                .context("initializing repository")?;
            info!("[Node] Generated peer identity {}", id);
            node.load().await.context("loading new repository")?;
        }
        Err(e) => return Err(e).context("loading repository"),
    }

    node.go_online().await.context("going online")?;

    let identity = node.identity().id().await?;
    info!("===========================================");
    info!("  Cairn node {}", identity.agent_version);
    info!("  Peer ID: {}", identity.id);
    for addr in &identity.addresses {
        info!("  Listening: {}", addr);
    }
    info!("===========================================");

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    if let Err(e) = node.shutdown().await {
        error!("[Node] Shutdown failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}
