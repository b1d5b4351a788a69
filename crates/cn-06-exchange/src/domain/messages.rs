//! Wire messages (bincode).

use serde::{Deserialize, Serialize};
use shared_types::ContentId;

use super::errors::ExchangeError;

/// Protocol name registered on the swarm.
pub const EXCHANGE_PROTOCOL: &str = "/cairn/exchange/1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeRequest {
    Want(ContentId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeResponse {
    Have { cid: ContentId, data: Vec<u8> },
    DontHave(ContentId),
}

impl ExchangeRequest {
    pub fn encode(&self) -> Result<Vec<u8>, ExchangeError> {
        bincode::serialize(self).map_err(|e| ExchangeError::Codec(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ExchangeError> {
        bincode::deserialize(bytes).map_err(|e| ExchangeError::Codec(e.to_string()))
    }
}

impl ExchangeResponse {
    pub fn encode(&self) -> Result<Vec<u8>, ExchangeError> {
        bincode::serialize(self).map_err(|e| ExchangeError::Codec(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ExchangeError> {
        bincode::deserialize(bytes).map_err(|e| ExchangeError::Codec(e.to_string()))
    }
}
