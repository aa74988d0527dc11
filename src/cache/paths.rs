// Cache path utilities.
// Maps gist identifiers to files under the cache directory.

use std::path::{Path, PathBuf};

use crate::error::{GistError, Result};

/// Path of the cache file for `identifier`: `{cache_dir}/{identifier}.{ext}`.
pub fn entry_path(cache_dir: &Path, identifier: &str, extension: &str) -> PathBuf {
    cache_dir.join(format!("{}.{}", identifier, extension))
}

/// Reject identifiers that could escape the cache directory or collide with
/// one another. Gist ids are hex strings; we also allow `-` and `_`.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    let valid = !identifier.is_empty()
        && identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(GistError::InvalidIdentifier(identifier.to_string()))
    }
}
