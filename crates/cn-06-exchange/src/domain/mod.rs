//! Domain layer for the exchange.

pub mod config;
pub mod errors;
pub mod messages;
pub mod stats;
