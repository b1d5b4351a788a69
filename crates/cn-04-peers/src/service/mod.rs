//! Peer services.

pub mod directory;
