//! # Config Document
//!
//! The persisted JSON document a node reads on load. Field names are
//! PascalCase on disk (`Identity.PeerID`, `Exchange.FetchTimeoutMs`, ...).
//!
//! Dotted key paths (`"Swarm.ConnectionLimit"`) address nested values for
//! `get`/`set`. Every edit is validated by decoding the whole document
//! back into [`RepoConfig`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::PeerAddr;

use super::errors::RepoError;

/// Default block fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

/// Default interval between want rebroadcasts.
pub const DEFAULT_REBROADCAST_INTERVAL_MS: u64 = 1_000;

/// Default maximum number of concurrent connections.
pub const DEFAULT_CONNECTION_LIMIT: usize = 256;

/// Top-level section holding identity material.
pub const IDENTITY_SECTION: &str = "Identity";

/// Persisted identity record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct IdentityRecord {
    /// Hex peer id derived from the public key.
    #[serde(rename = "PeerID")]
    pub peer_id: String,
    /// Hex private key seed.
    pub priv_key: String,
    /// Entropy size the key was generated with.
    pub key_bits: u32,
}

impl fmt::Debug for IdentityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityRecord")
            .field("peer_id", &self.peer_id)
            .field("priv_key", &"<redacted>")
            .field("key_bits", &self.key_bits)
            .finish()
    }
}

/// Listen addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AddressesConfig {
    pub swarm: Vec<PeerAddr>,
}

impl Default for AddressesConfig {
    fn default() -> Self {
        Self {
            swarm: vec![PeerAddr::new("/memory/0")],
        }
    }
}

/// Block exchange tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default, deny_unknown_fields)]
pub struct ExchangeSection {
    pub fetch_timeout_ms: u64,
    pub rebroadcast_interval_ms: u64,
}

impl Default for ExchangeSection {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            rebroadcast_interval_ms: DEFAULT_REBROADCAST_INTERVAL_MS,
        }
    }
}

/// Swarm limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default, deny_unknown_fields)]
pub struct SwarmSection {
    pub connection_limit: usize,
}

impl Default for SwarmSection {
    fn default() -> Self {
        Self {
            connection_limit: DEFAULT_CONNECTION_LIMIT,
        }
    }
}

/// The persisted config document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RepoConfig {
    pub identity: IdentityRecord,
    #[serde(default)]
    pub addresses: AddressesConfig,
    #[serde(default)]
    pub bootstrap: Vec<PeerAddr>,
    #[serde(default)]
    pub exchange: ExchangeSection,
    #[serde(default)]
    pub swarm: SwarmSection,
}

impl RepoConfig {
    /// Document with default sections around `identity`.
    pub fn new(identity: IdentityRecord) -> Self {
        Self {
            identity,
            addresses: AddressesConfig::default(),
            bootstrap: Vec::new(),
            exchange: ExchangeSection::default(),
            swarm: SwarmSection::default(),
        }
    }

    /// Whole document as JSON.
    pub fn to_value(&self) -> Result<Value, RepoError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decode and validate a whole document.
    pub fn from_value(value: Value) -> Result<Self, RepoError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Value at a dotted key path. An empty key returns the whole document.
    pub fn get(&self, key: &str) -> Result<Option<Value>, RepoError> {
        let doc = self.to_value()?;
        if key.is_empty() {
            return Ok(Some(doc));
        }
        let mut cursor = &doc;
        for segment in split_key(key)? {
            match cursor.get(segment) {
                Some(next) => cursor = next,
                None => return Ok(None),
            }
        }
        Ok(Some(cursor.clone()))
    }

    /// Copy of the document with `value` written at the dotted key path.
    ///
    /// Missing intermediate objects are created. The result must still
    /// decode as a valid document.
    pub fn with_value(&self, key: &str, value: Value) -> Result<Self, RepoError> {
        let segments = split_key(key)?;
        let mut doc = self.to_value()?;

        let (last, parents) = segments.split_last().ok_or_else(|| RepoError::Config {
            message: "empty config key".to_string(),
        })?;
        let mut cursor = &mut doc;
        for segment in parents {
            let object = cursor.as_object_mut().ok_or_else(|| RepoError::Config {
                message: format!("{key}: {segment} is not inside an object"),
            })?;
            cursor = object
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Default::default()));
        }
        let object = cursor.as_object_mut().ok_or_else(|| RepoError::Config {
            message: format!("{key}: parent is not an object"),
        })?;
        object.insert(last.to_string(), value);

        Self::from_value(doc)
    }

    /// True when `key` addresses the identity section or something in it.
    pub fn is_identity_key(key: &str) -> bool {
        key == IDENTITY_SECTION
            || key
                .strip_prefix(IDENTITY_SECTION)
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

fn split_key(key: &str) -> Result<Vec<&str>, RepoError> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(RepoError::Config {
            message: format!("malformed config key {key:?}"),
        });
    }
    Ok(segments)
}
