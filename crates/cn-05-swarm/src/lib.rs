//! # Swarm (cn-05)
//!
//! Connection management for an online session, behind two ports:
//!
//! - [`Transport`]: builds one [`Swarm`] per online session.
//! - [`Swarm`]: listen, dial, hang up, ping and request/response over
//!   registered protocols.
//!
//! The bundled [`MemoryNetwork`] adapter connects swarms living in the same
//! process. Addresses look like `/memory/<port>`; listening on
//! `/memory/0` allocates a free port.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::memory::{MemoryNetwork, MemorySwarm};
pub use domain::config::SwarmConfig;
pub use domain::errors::SwarmError;
pub use ports::{ProtocolHandler, Swarm, Transport};
