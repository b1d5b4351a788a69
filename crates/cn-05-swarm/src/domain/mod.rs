//! Domain layer for the swarm subsystem.

pub mod config;
pub mod errors;
