//! # Key Layout
//!
//! Datastore keys are slash-separated paths. Segments are restricted to a
//! filesystem-safe alphabet so the filesystem datastore can map keys to
//! files one-to-one.

use shared_types::ContentId;

use super::errors::RepoError;

/// Config document key.
pub const CONFIG_KEY: &str = "/config";

/// Repository format version key.
pub const VERSION_KEY: &str = "/version";

/// Prefix shared by all block keys.
pub const BLOCKS_PREFIX: &str = "/blocks/";

/// Key under which the block `cid` is stored.
///
/// Blocks are sharded by the next-to-last two characters of the text id,
/// keeping directories small on disk.
pub fn block_key(cid: &ContentId) -> String {
    let text = cid.to_string();
    let len = text.len();
    format!("{}{}/{}", BLOCKS_PREFIX, &text[len - 3..len - 1], text)
}

/// Recover the content id from a block key.
pub fn cid_from_block_key(key: &str) -> Option<ContentId> {
    key.strip_prefix(BLOCKS_PREFIX)?
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}

/// Validate a datastore key.
pub fn validate_key(key: &str) -> Result<(), RepoError> {
    let invalid = || RepoError::InvalidKey {
        key: key.to_string(),
    };

    let body = key.strip_prefix('/').ok_or_else(invalid)?;
    if body.is_empty() {
        return Err(invalid());
    }
    for segment in body.split('/') {
        if segment.is_empty() || segment.starts_with('.') {
            return Err(invalid());
        }
        if !segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.')
        {
            return Err(invalid());
        }
    }
    Ok(())
}
