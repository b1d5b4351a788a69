//! Domain layer for the block store.

pub mod cache;
pub mod errors;
pub mod options;
