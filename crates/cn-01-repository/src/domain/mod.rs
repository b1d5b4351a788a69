//! Domain layer for the repository subsystem.

pub mod config;
pub mod errors;
pub mod keys;
