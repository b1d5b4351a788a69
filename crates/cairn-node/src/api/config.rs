//! Persisted config document.
//!
//! Keys are dotted paths into the PascalCase document, e.g.
//! `Exchange.FetchTimeoutMs`. Every edit is validated against the document
//! schema before it is committed. The `Identity` section is read-only here;
//! it only changes through `init`.

use std::sync::Arc;

use cn_01_repository::RepoConfig;
use serde_json::Value;

use crate::error::{NodeError, Result};
use crate::setup::Setup;

#[derive(Clone)]
pub struct ConfigApi {
    setup: Arc<Setup>,
}

impl ConfigApi {
    pub(crate) fn new(setup: Arc<Setup>) -> Self {
        Self { setup }
    }

    /// Value at `key`. Fails `NotFound` for keys absent from the document.
    pub async fn get(&self, key: &str) -> Result<Value> {
        let loaded = self.setup.load().await?;
        loaded
            .config
            .get(key)?
            .ok_or_else(|| NodeError::NotFound(format!("config key {key}")))
    }

    pub async fn set(&self, key: &str, value: Value) -> Result<()> {
        if key.is_empty() {
            return Err(NodeError::InvalidInput("empty config key".to_string()));
        }
        if RepoConfig::is_identity_key(key) {
            return Err(NodeError::InvalidInput(format!("{key} is read-only")));
        }
        self.setup
            .update_config(|config| Ok(config.with_value(key, value)?))
            .await?;
        Ok(())
    }

    /// The whole document.
    pub async fn show(&self) -> Result<RepoConfig> {
        Ok(self.setup.load().await?.config.clone())
    }

    /// Replace every section except `Identity`.
    pub async fn replace(&self, config: RepoConfig) -> Result<()> {
        self.setup.update_config(move |_| Ok(config)).await?;
        Ok(())
    }
}
