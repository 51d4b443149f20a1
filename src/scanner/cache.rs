//! Scan result cache keyed by scan root and validated by fingerprint.
//!
//! The fingerprint covers the root, every candidate file's relative path,
//! modification time and length, and the scanner settings that shape the
//! output. An entry is served only when its fingerprint matches; storing a
//! new fingerprint for the same root replaces the old entry.

use super::result::ScanResult;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::UNIX_EPOCH;
use thiserror::Error;
use tracing::{debug, warn};

/// Cache failures never fail a scan; callers log them and go on uncached.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to read cache file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write cache file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt cache file {path}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cache lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    fingerprint: String,
    result: ScanResult,
}

#[derive(Debug, Default)]
pub struct ScanCache {
    entries: RwLock<FxHashMap<PathBuf, CacheEntry>>,
    path: Option<PathBuf>,
}

impl ScanCache {
    /// In-memory only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`; a missing file gives an empty cache that will be
    /// written there by [`save`](Self::save).
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| CacheError::Format {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FxHashMap::default(),
            Err(source) => return Err(CacheError::Read { path, source }),
        };
        Ok(Self {
            entries: RwLock::new(entries),
            path: Some(path),
        })
    }

    /// Like [`load`](Self::load), but an unreadable or corrupt file is
    /// logged and replaced by an empty cache.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::load(&path).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring scan cache");
            Self {
                entries: RwLock::default(),
                path: Some(path),
            }
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write to the backing file, if any.
    pub fn save(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let entries = self.entries.read().map_err(|_| CacheError::Poisoned)?;
        let text = serde_json::to_string(&*entries).map_err(|source| CacheError::Format {
            path: path.clone(),
            source,
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| CacheError::Write {
                path: path.clone(),
                source,
            })?;
        }
        fs::write(path, text).map_err(|source| CacheError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), entries = entries.len(), "Saved scan cache");
        Ok(())
    }

    pub fn lookup(&self, root: &Path, fingerprint: &str) -> Option<ScanResult> {
        let entries = self.entries.read().ok()?;
        match entries.get(root) {
            Some(entry) if entry.fingerprint == fingerprint => {
                debug!(root = %root.display(), "Scan cache hit");
                Some(entry.result.clone())
            }
            Some(_) => {
                debug!(root = %root.display(), "Scan cache stale");
                None
            }
            None => {
                debug!(root = %root.display(), "Scan cache miss");
                None
            }
        }
    }

    /// Last writer wins.
    pub fn store(&self, root: &Path, fingerprint: String, result: ScanResult) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(root.to_path_buf(), CacheEntry { fingerprint, result });
            }
            Err(_) => warn!(error = %CacheError::Poisoned, "Scan result not cached"),
        }
    }

    pub fn invalidate(&self, root: &Path) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(root);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hex SHA-256 over the root, each file's relative path, mtime and length,
/// and `settings`.
pub fn fingerprint(root: &Path, files: &[PathBuf], settings: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(root.to_string_lossy().as_bytes());
    hasher.update([0]);
    for file in files {
        let relative = file.strip_prefix(root).unwrap_or(file);
        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update([0]);
        match fs::metadata(file) {
            Ok(meta) => {
                let mtime = meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_nanos())
                    .unwrap_or_default();
                hasher.update(mtime.to_le_bytes());
                hasher.update(meta.len().to_le_bytes());
            }
            Err(_) => hasher.update(b"unreadable"),
        }
        hasher.update([0]);
    }
    hasher.update(settings.as_bytes());
    format!("{:x}", hasher.finalize())
}
