//! Domain layer for the peers subsystem.

pub mod errors;
pub mod identity;
pub mod peer;
