//! CLI command handlers.
//!
//! This module contains all the handler functions for CLI commands,
//! separated from main.rs to enable unit testing.

mod convert;
mod scan;

use crate::config::{Config, ConfigError};
use crate::convert::document_to_json;
use crate::error::{AcfError, Result};
use crate::normalize::FieldGroupDocument;
use std::fs;
use std::path::{Path, PathBuf};
use rustc_hash::FxHashSet;
use std::process::ExitCode;
use tracing::{debug, warn};

pub use convert::{handle_to_json, handle_to_php};
pub use scan::handle_scan;

/// Result type for handler functions that can be tested.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResult {
    Success,
    Error(u8),
}

impl HandlerResult {
    pub const WARNINGS: Self = Self::Error(1);
    pub const FATAL: Self = Self::Error(2);
}

impl From<HandlerResult> for ExitCode {
    fn from(result: HandlerResult) -> Self {
        match result {
            HandlerResult::Success => ExitCode::SUCCESS,
            HandlerResult::Error(code) => ExitCode::from(code),
        }
    }
}

/// An explicit `--config` file must load; otherwise search from `project_root`.
fn load_config(explicit: Option<&Path>, project_root: &Path) -> std::result::Result<Config, ConfigError> {
    match explicit {
        Some(path) => Config::from_file(path),
        None => Ok(Config::load(Some(project_root))),
    }
}

/// Write each group to `<out_dir>/<key>.json`, the local-JSON layout.
///
/// A key seen twice in one run (or two keys mapping to the same file name)
/// gets `-2`, `-3`, ... appended instead of replacing the earlier file.
fn write_documents<'a, I>(out_dir: &Path, documents: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = &'a FieldGroupDocument>,
{
    fs::create_dir_all(out_dir).map_err(|e| AcfError::WriteError {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    let mut taken: FxHashSet<String> = FxHashSet::default();
    let mut written = Vec::new();
    for doc in documents {
        let stem = file_stem(&doc.key);
        let name = unique_stem(&stem, &mut taken);
        let path = out_dir.join(format!("{}.json", name));
        if name != stem {
            warn!(key = %doc.key, path = %path.display(), "File name already used in this run, writing under a distinct name");
        }
        fs::write(&path, document_to_json(doc)).map_err(|e| AcfError::WriteError {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), key = %doc.key, "Wrote field group");
        written.push(path);
    }
    Ok(written)
}

/// Compared case-insensitively so the names stay distinct on any filesystem.
fn unique_stem(stem: &str, taken: &mut FxHashSet<String>) -> String {
    let mut candidate = stem.to_string();
    let mut n = 1;
    while !taken.insert(candidate.to_ascii_lowercase()) {
        n += 1;
        candidate = format!("{}-{}", stem, n);
    }
    candidate
}

/// Keys are used as file names; anything outside `[A-Za-z0-9_.-]` becomes `_`.
fn file_stem(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match stem.trim_start_matches('.') {
        "" => "_".to_string(),
        s => s.to_string(),
    }
}
