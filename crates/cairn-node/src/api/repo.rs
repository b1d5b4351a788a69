//! Repository inspection.

use std::path::PathBuf;
use std::sync::Arc;

use cn_01_repository::{RepoStat, Repository};

use crate::error::Result;

#[derive(Clone)]
pub struct RepoApi {
    repo: Arc<Repository>,
}

impl RepoApi {
    pub(crate) fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Block count, total size, location and format version.
    pub async fn stat(&self) -> Result<RepoStat> {
        Ok(self.repo.stat().await?)
    }

    pub async fn version(&self) -> Result<u32> {
        Ok(self.repo.version().await?)
    }

    /// On-disk location; `None` for in-memory repositories.
    pub fn path(&self) -> Option<PathBuf> {
        self.repo.path().map(PathBuf::from)
    }
}
