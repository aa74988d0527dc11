// Cache store for gist documents.
// One plain-text file per identifier; freshness comes from the file's mtime.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{GistError, Result};

use super::paths::entry_path;

/// What the cache holds for an identifier, relative to the freshness threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No cache file exists.
    Absent,
    /// A zero-length file existed and has been deleted.
    Invalid,
    /// Non-empty and younger than the threshold: serve without a network call.
    Fresh { stored_at: SystemTime },
    /// Non-empty but older than the threshold: revalidate with `If-Modified-Since`.
    Stale { stored_at: SystemTime },
}

impl CacheState {
    /// Modification time usable for a conditional request, if any.
    pub fn stored_at(&self) -> Option<SystemTime> {
        match self {
            CacheState::Fresh { stored_at } | CacheState::Stale { stored_at } => Some(*stored_at),
            CacheState::Absent | CacheState::Invalid => None,
        }
    }
}

/// Identifier-keyed document storage under a single directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
    extension: String,
    freshness: Duration,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>, freshness: Duration) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            freshness,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.cache_dir.clone(),
            config.cache_extension.clone(),
            config.freshness,
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the cache file for `identifier`.
    pub fn path(&self, identifier: &str) -> PathBuf {
        entry_path(&self.dir, identifier, &self.extension)
    }

    /// Classify the cached copy of `identifier`.
    ///
    /// Zero-length files are left behind by interrupted writes; they are
    /// deleted here and reported as [`CacheState::Invalid`].
    pub fn classify(&self, identifier: &str) -> Result<CacheState> {
        let path = self.path(identifier);
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(identifier, "no cache entry");
                return Ok(CacheState::Absent);
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.len() == 0 {
            warn!(path = %path.display(), "removing zero-length cache file");
            remove_if_exists(&path)?;
            return Ok(CacheState::Invalid);
        }

        let stored_at = metadata.modified()?;
        let age = SystemTime::now()
            .duration_since(stored_at)
            .unwrap_or(Duration::ZERO);

        if age < self.freshness {
            debug!(identifier, age_secs = age.as_secs(), "cache entry is fresh");
            Ok(CacheState::Fresh { stored_at })
        } else {
            debug!(identifier, age_secs = age.as_secs(), "cache entry is stale");
            Ok(CacheState::Stale { stored_at })
        }
    }

    /// Read the stored document. Missing, empty or non-UTF-8 entries are
    /// reported as [`GistError::CacheCorrupt`].
    pub fn read(&self, identifier: &str) -> Result<String> {
        let corrupt = || GistError::CacheCorrupt {
            identifier: identifier.to_string(),
        };

        match fs::read_to_string(self.path(identifier)) {
            Ok(content) if content.is_empty() => Err(corrupt()),
            Ok(content) => Ok(content),
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::InvalidData) => {
                Err(corrupt())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist `content` for `identifier`, creating the cache directory if needed.
    ///
    /// The document is written to a temp file in the same directory and renamed
    /// into place, so readers see either the old or the new content in full.
    pub fn write(&self, identifier: &str, content: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(self.path(identifier))?;

        debug!(identifier, bytes = content.len(), "wrote cache entry");
        Ok(())
    }

    /// Delete the entry for `identifier` if present.
    pub fn remove(&self, identifier: &str) -> Result<()> {
        remove_if_exists(&self.path(identifier))
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
