//! File and directory layout.

use std::sync::Arc;

use cn_02_block_store::BlockStore;
use cn_03_graph::{AddEntry, AddedEntry, FileLayout, GetEntry};

use crate::error::Result;

#[derive(Clone)]
pub struct FilesApi {
    layout: FileLayout,
}

impl FilesApi {
    pub(crate) fn new(blocks: Arc<BlockStore>) -> Self {
        Self {
            layout: FileLayout::new(blocks),
        }
    }

    /// Store files and directories. Returns one entry per stored path,
    /// parents last.
    pub async fn add(&self, entries: Vec<AddEntry>) -> Result<Vec<AddedEntry>> {
        Ok(self.layout.add(entries).await?)
    }

    /// Store a single unnamed file.
    pub async fn add_bytes(&self, content: &[u8]) -> Result<AddedEntry> {
        Ok(self.layout.add_bytes(content).await?)
    }

    /// File content at `path`.
    pub async fn cat(&self, path: &str) -> Result<Vec<u8>> {
        Ok(self.layout.cat(path).await?)
    }

    /// Every file and directory under `path`, parents first.
    pub async fn get(&self, path: &str) -> Result<Vec<GetEntry>> {
        Ok(self.layout.get(path).await?)
    }
}
