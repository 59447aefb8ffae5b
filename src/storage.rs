//! JSON file cache for summaries.
//!
//! Summaries are keyed by a hash of the review text. The file is read once
//! at the start of a run and written once at the end.

use crate::summary::Summary;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Hash → summary map backed by a JSON file.
#[derive(Debug, Clone)]
pub struct ReviewCache {
    path: PathBuf,
    entries: BTreeMap<String, Summary>,
}

impl ReviewCache {
    /// Load the cache at `path`. Missing or corrupt files give an empty cache.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries: BTreeMap<String, Summary> = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring corrupt cache file");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable cache file");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), entries = entries.len(), "cache loaded");
        Self { path, entries }
    }

    /// Write the cache back to its file, creating parent directories
    pub fn save(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Cached summary for a review text
    pub fn get(&self, text: &str) -> Option<&Summary> {
        self.entries.get(&hash_text(text))
    }

    pub fn insert(&mut self, text: &str, summary: Summary) {
        self.entries.insert(hash_text(text), summary);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the number of cached summaries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Hex SHA-1 of the review text, used as the cache key.
///
/// Matches the keys written by the Python `steam-snapshots` tool, so its
/// cache files keep hitting.
pub fn hash_text(text: &str) -> String {
    hex::encode(Sha1::digest(text.as_bytes()))
}
