//! # Repository Lock
//!
//! Keeps two processes from opening the same repository directory.
//!
//! - Non-blocking acquisition: a held lock fails fast with
//!   [`LockError::AlreadyLocked`].
//! - Locks left behind by a dead process are detected by PID and reclaimed.

mod flock;

pub use flock::{LockError, RepoLock};
