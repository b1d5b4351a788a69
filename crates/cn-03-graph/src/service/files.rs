//! # File Layout
//!
//! Content up to one chunk is stored as a single raw block. Longer content
//! is split into raw leaves of `chunk_size` bytes, then grouped bottom-up
//! into file nodes of at most `max_links` links until one root remains.
//!
//! Directories are nodes whose links are the named entries, sorted by name.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use cn_02_block_store::BlockStore;
use shared_types::{Block, Codec, ContentId};
use tracing::debug;

use crate::domain::errors::GraphError;
use crate::domain::node::{DagLink, DagNode};
use crate::domain::unixfs::{FileMeta, NodeKind};
use crate::service::resolver::{parse_path, GraphResolver};

/// Leaf size used by [`FileLayout::new`].
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Maximum links per file node used by [`FileLayout::new`].
pub const DEFAULT_MAX_LINKS: usize = 174;

/// Input to [`FileLayout::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddEntry {
    File { path: String, content: Vec<u8> },
    Directory { path: String },
}

impl AddEntry {
    pub fn file(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        AddEntry::File {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        AddEntry::Directory { path: path.into() }
    }
}

/// One stored file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedEntry {
    pub path: String,
    pub cid: ContentId,
    /// Cumulative size of the stored tree.
    pub size: u64,
}

/// One materialised file or directory. Directories have no content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetEntry {
    pub path: String,
    pub content: Option<Vec<u8>>,
}

struct Piece {
    cid: ContentId,
    content_size: u64,
    cumulative_size: u64,
}

/// Lays files and directories out as linked blocks.
#[derive(Clone)]
pub struct FileLayout {
    blocks: Arc<BlockStore>,
    resolver: GraphResolver,
    chunk_size: usize,
    max_links: usize,
}

impl FileLayout {
    pub fn new(blocks: Arc<BlockStore>) -> Self {
        Self::with_chunking(blocks, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_LINKS)
    }

    /// Layout with a custom leaf size and fan-out (at least 1 and 2).
    pub fn with_chunking(blocks: Arc<BlockStore>, chunk_size: usize, max_links: usize) -> Self {
        Self {
            resolver: GraphResolver::new(Arc::clone(&blocks)),
            blocks,
            chunk_size: chunk_size.max(1),
            max_links: max_links.max(2),
        }
    }

    // =========================================================================
    // ADD
    // =========================================================================

    /// Store `content` as a single unnamed file.
    pub async fn add_bytes(&self, content: &[u8]) -> Result<AddedEntry, GraphError> {
        let piece = self.write_file(content).await?;
        Ok(AddedEntry {
            path: piece.cid.to_string(),
            cid: piece.cid,
            size: piece.cumulative_size,
        })
    }

    /// Store a set of files and directories.
    ///
    /// Parent directories are implied by entry paths. Output lists files
    /// first, then directories deepest first, so top-level entries come
    /// last.
    pub async fn add(&self, entries: Vec<AddEntry>) -> Result<Vec<AddedEntry>, GraphError> {
        let mut files: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        let mut dirs: BTreeSet<String> = BTreeSet::new();

        for entry in entries {
            let (path, content) = match entry {
                AddEntry::File { path, content } => (path, Some(content)),
                AddEntry::Directory { path } => (path, None),
            };
            let segments = normalize(&path)?;
            for depth in 1..segments.len() {
                dirs.insert(segments[..depth].join("/"));
            }
            let joined = segments.join("/");
            match content {
                Some(content) => {
                    files.insert(joined, content);
                }
                None => {
                    dirs.insert(joined);
                }
            }
        }
        if let Some(clash) = files.keys().find(|f| dirs.contains(*f)) {
            return Err(GraphError::InvalidPath(format!(
                "{clash} is both a file and a directory"
            )));
        }

        let mut out = Vec::with_capacity(files.len() + dirs.len());
        let mut children: HashMap<String, BTreeMap<String, (ContentId, u64)>> = HashMap::new();

        for (path, content) in &files {
            let piece = self.write_file(content).await?;
            let (parent, name) = split_parent(path);
            children
                .entry(parent.to_string())
                .or_default()
                .insert(name.to_string(), (piece.cid, piece.cumulative_size));
            out.push(AddedEntry {
                path: path.clone(),
                cid: piece.cid,
                size: piece.cumulative_size,
            });
        }

        let mut ordered: Vec<String> = dirs.into_iter().collect();
        ordered.sort_by(|a, b| depth(b).cmp(&depth(a)).then_with(|| a.cmp(b)));

        for dir in ordered {
            let links = children
                .remove(&dir)
                .unwrap_or_default()
                .into_iter()
                .map(|(name, (cid, size))| DagLink::new(name, cid, size))
                .collect();
            let node = DagNode::new(FileMeta::directory().encode()?, links);
            let block = node.to_block()?;
            let size = block.len() as u64 + node.links_cumulative_size();
            let cid = self.blocks.put(block).await?;

            let (parent, name) = split_parent(&dir);
            children
                .entry(parent.to_string())
                .or_default()
                .insert(name.to_string(), (cid, size));
            out.push(AddedEntry {
                path: dir,
                cid,
                size,
            });
        }

        debug!("[cn-03] Added {} entries", out.len());
        Ok(out)
    }

    async fn write_file(&self, content: &[u8]) -> Result<Piece, GraphError> {
        if content.len() <= self.chunk_size {
            let cid = self.blocks.put(Block::new(content.to_vec())).await?;
            return Ok(Piece {
                cid,
                content_size: content.len() as u64,
                cumulative_size: content.len() as u64,
            });
        }

        let mut layer = Vec::with_capacity(content.len().div_ceil(self.chunk_size));
        for chunk in content.chunks(self.chunk_size) {
            let cid = self.blocks.put(Block::new(chunk.to_vec())).await?;
            layer.push(Piece {
                cid,
                content_size: chunk.len() as u64,
                cumulative_size: chunk.len() as u64,
            });
        }

        while layer.len() > 1 {
            let mut next = Vec::with_capacity(layer.len().div_ceil(self.max_links));
            for group in layer.chunks(self.max_links) {
                let meta = FileMeta::file(group.iter().map(|p| p.content_size).collect());
                let links = group
                    .iter()
                    .map(|p| DagLink::new("", p.cid, p.cumulative_size))
                    .collect();
                let node = DagNode::new(meta.encode()?, links);
                let block = node.to_block()?;
                let cumulative_size = block.len() as u64 + node.links_cumulative_size();
                let cid = self.blocks.put(block).await?;
                next.push(Piece {
                    cid,
                    content_size: meta.filesize,
                    cumulative_size,
                });
            }
            layer = next;
        }

        layer
            .pop()
            .ok_or_else(|| GraphError::Encode("file layout produced no root".to_string()))
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Full content of the file at `path`.
    pub async fn cat(&self, path: &str) -> Result<Vec<u8>, GraphError> {
        let cid = self.resolver.resolve(path).await?;
        self.read_file(&cid, path).await
    }

    /// Every file and directory at or below `path`, parents before children.
    pub async fn get(&self, path: &str) -> Result<Vec<GetEntry>, GraphError> {
        let (root, segments) = parse_path(path)?;
        let base = std::iter::once(root.to_string())
            .chain(segments.iter().cloned())
            .collect::<Vec<_>>()
            .join("/");
        let root = self.resolver.resolve_segments(root, segments).await?;

        let mut out = Vec::new();
        let mut pending = vec![(base, root)];
        while let Some((entry_path, cid)) = pending.pop() {
            match self.directory_links(&cid).await? {
                Some(links) => {
                    for link in links.iter().rev() {
                        pending.push((format!("{}/{}", entry_path, link.name), link.cid));
                    }
                    out.push(GetEntry {
                        path: entry_path,
                        content: None,
                    });
                }
                None => {
                    let content = self.read_file(&cid, &entry_path).await?;
                    out.push(GetEntry {
                        path: entry_path,
                        content: Some(content),
                    });
                }
            }
        }
        Ok(out)
    }

    /// Links of `cid` if it is a directory, `None` if it is a file.
    async fn directory_links(&self, cid: &ContentId) -> Result<Option<Vec<DagLink>>, GraphError> {
        if cid.codec() == Codec::Raw {
            return Ok(None);
        }
        let node = DagNode::from_block(&self.blocks.get(cid).await?)?;
        let meta = FileMeta::decode(&node.data).ok_or(GraphError::NotUnixfs(*cid))?;
        Ok(match meta.kind {
            NodeKind::Directory => Some(node.links),
            NodeKind::File => None,
        })
    }

    async fn read_file(&self, cid: &ContentId, display: &str) -> Result<Vec<u8>, GraphError> {
        let mut out = Vec::new();
        let mut pending = vec![*cid];
        while let Some(next) = pending.pop() {
            let block = self.blocks.get(&next).await?;
            match next.codec() {
                Codec::Raw => out.extend_from_slice(block.data()),
                Codec::DagNode => {
                    let node = DagNode::decode(block.data())?;
                    let meta = FileMeta::decode(&node.data).ok_or(GraphError::NotUnixfs(next))?;
                    if meta.kind == NodeKind::Directory {
                        return Err(GraphError::IsDirectory(display.to_string()));
                    }
                    pending.extend(node.links.iter().rev().map(|l| l.cid));
                }
            }
        }
        Ok(out)
    }
}

fn normalize(path: &str) -> Result<Vec<String>, GraphError> {
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if segments.is_empty() || segments.iter().any(|s| s == "." || s == "..") {
        return Err(GraphError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

fn depth(path: &str) -> usize {
    path.matches('/').count()
}
