//! # Adapters Module
//!
//! - `memory`: in-process [`MemoryDatastore`]
//! - `fs`: file-per-key [`FsDatastore`]
//! - `lock`: repository process lock (singleton guard)

pub mod fs;
pub mod lock;
pub mod memory;

pub use fs::FsDatastore;
pub use lock::{LockError, RepoLock};
pub use memory::MemoryDatastore;
