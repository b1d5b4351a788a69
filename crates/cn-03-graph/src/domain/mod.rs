//! Domain layer for the graph subsystem.

pub mod errors;
pub mod node;
pub mod unixfs;
