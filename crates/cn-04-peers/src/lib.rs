//! # Peers (cn-04)
//!
//! - [`PeerIdentity`]: the node's persistent Ed25519 keypair. The peer id is
//!   the SHA-256 of the public key, so a stored id can always be checked
//!   against the stored key.
//! - [`PeerDirectory`]: peer id to address/metadata map. Built fresh for each
//!   online session and never persisted.

pub mod domain;
pub mod service;

pub use domain::errors::PeerError;
pub use domain::identity::{PeerIdentity, DEFAULT_KEY_BITS, MAX_KEY_BITS, MIN_KEY_BITS};
pub use domain::peer::PeerInfo;
pub use service::directory::PeerDirectory;
