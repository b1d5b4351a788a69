//! # Repository (cn-01)
//!
//! Persistent home of a node: the config document (with the embedded
//! identity record), the repository version marker and every stored block.
//!
//! ## Key Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `/config` | JSON [`RepoConfig`] including the `Identity` section |
//! | `/version` | Repository format version, decimal text |
//! | `/blocks/<shard>/<cid>` | Raw block payload |
//!
//! The identity lives inside the config document so that initialization
//! commits a single key and can never leave a half-written repository.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Config document, key layout, errors
//! - `ports/` - [`Datastore`] outbound port
//! - `adapters/` - In-memory and filesystem datastores, process lock
//! - `service/` - [`Repository`] application service
//!
//! ## Usage
//!
//! ```ignore
//! use cn_01_repository::Repository;
//!
//! let repo = Repository::at_path("/tmp/cairn");
//! repo.open().await?;
//! if let Some(config) = repo.read_config().await? {
//!     println!("peer {}", config.identity.peer_id);
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FsDatastore, LockError, MemoryDatastore, RepoLock};
pub use domain::config::{
    AddressesConfig, ExchangeSection, IdentityRecord, RepoConfig, SwarmSection,
};
pub use domain::errors::RepoError;
pub use domain::keys;
pub use ports::outbound::{BatchOperation, Datastore};
pub use service::{RepoStat, Repository, REPO_VERSION};
