//! Port definitions for the repository subsystem.

pub mod outbound;
