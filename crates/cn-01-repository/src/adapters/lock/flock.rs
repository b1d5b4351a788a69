//! File lock built on `fs2` (flock on Unix, LockFile on Windows).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

/// Errors from repository locking.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("Failed to create lock file: {0}")]
    CreateFailed(#[source] io::Error),

    #[error("Repository already in use (holder {:?}, {})", .pid, .path.display())]
    AlreadyLocked { pid: Option<u32>, path: PathBuf },

    #[error("Failed to write PID to lock file: {0}")]
    WriteFailed(#[source] io::Error),
}

/// Exclusive lock on a repository directory, released on drop.
#[derive(Debug)]
pub struct RepoLock {
    file: File,
    path: PathBuf,
    pid: u32,
}

impl RepoLock {
    /// Lock file name inside the repository root.
    pub const LOCK_FILE: &'static str = "repo.lock";

    /// Acquire the lock on `root`, which must already exist.
    pub fn acquire(root: &Path) -> Result<Self, LockError> {
        let lock_path = root.join(Self::LOCK_FILE);

        // One reclaim attempt for a lock left by a dead process.
        for _ in 0..2 {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(&lock_path)
                .map_err(LockError::CreateFailed)?;

            match file.try_lock_exclusive() {
                Ok(()) => {
                    let pid = std::process::id();
                    let mut locked = file;
                    locked.set_len(0).map_err(LockError::WriteFailed)?;
                    writeln!(locked, "{}", pid).map_err(LockError::WriteFailed)?;
                    locked.sync_all().map_err(LockError::WriteFailed)?;
                    return Ok(Self {
                        file: locked,
                        path: lock_path,
                        pid,
                    });
                }
                Err(_) => {
                    let holder = Self::read_existing_pid(&lock_path);
                    match holder {
                        Some(pid) if !is_process_running(pid) => {
                            drop(file);
                            let _ = std::fs::remove_file(&lock_path);
                        }
                        _ => {
                            return Err(LockError::AlreadyLocked {
                                pid: holder,
                                path: lock_path,
                            })
                        }
                    }
                }
            }
        }

        Err(LockError::AlreadyLocked {
            pid: Self::read_existing_pid(&lock_path),
            path: lock_path,
        })
    }

    /// PID recorded in the lock file.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        #[allow(clippy::incompatible_msrv)]
        let _ = self.file.unlock();
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Whether a process with `pid` is alive.
fn is_process_running(pid: u32) -> bool {
    #[cfg(unix)]
    {
        Path::new(&format!("/proc/{}", pid)).exists()
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        true
    }
}
