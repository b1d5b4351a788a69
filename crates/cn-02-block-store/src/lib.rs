//! # Block Store (cn-02)
//!
//! Get/put of content-addressed blocks over the repository, with an
//! optional fallback to the block exchange for blocks not held locally.
//!
//! ## Invariants
//!
//! - A block is only persisted after its id has been re-derived from its
//!   payload. Mismatches fail with [`BlockError::IdentityMismatch`] and
//!   leave the store untouched.
//! - Storing a block twice is a no-op.
//! - The store never owns the exchange. It holds a weak reference that the
//!   node attaches when it goes online and detaches when it goes offline.
//!
//! ## Crate Structure
//!
//! - `domain/` - errors, get options, bounded block cache
//! - `ports/` - [`ExchangeHook`] for network fallback
//! - `service/` - [`BlockStore`]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::cache::BlockCache;
pub use domain::errors::BlockError;
pub use domain::options::{BlockStat, GetOptions};
pub use ports::ExchangeHook;
pub use service::BlockStore;
