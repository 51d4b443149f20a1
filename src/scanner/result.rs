//! Scan result types.

use crate::normalize::FieldGroupDocument;
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Directory entry or file that could not be read.
    Io,
    /// Malformed literal or call argument.
    Parse,
    /// Call argument is not an array literal.
    NotALiteral,
    /// Literal followed by more expression inside the call argument.
    TrailingInput,
    /// Literal that is not a valid field group.
    Normalization,
    /// Key filled in by the normalizer.
    SynthesizedKey,
    /// Same group key declared more than once.
    DuplicateKey,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Io => "io",
            Self::Parse => "parse",
            Self::NotALiteral => "not-a-literal",
            Self::TrailingInput => "trailing-input",
            Self::Normalization => "normalization",
            Self::SynthesizedKey => "synthesized-key",
            Self::DuplicateKey => "duplicate-key",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    pub kind: WarningKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    pub message: String,
    /// Every file involved, for warnings spanning several files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,
}

impl ScanWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            file: None,
            offset: None,
            message: message.into(),
            files: Vec::new(),
        }
    }

    pub fn at(kind: WarningKind, file: &Path, offset: usize, message: impl Into<String>) -> Self {
        Self {
            file: Some(file.to_path_buf()),
            offset: Some(offset),
            ..Self::new(kind, message)
        }
    }

    pub fn in_file(kind: WarningKind, file: &Path, message: impl Into<String>) -> Self {
        Self {
            file: Some(file.to_path_buf()),
            ..Self::new(kind, message)
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.offset) {
            (Some(file), Some(offset)) => write!(f, "{}@{}: {}", file.display(), offset, self.message),
            (Some(file), None) => write!(f, "{}: {}", file.display(), self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// A field group and where it was declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedDocument {
    pub file: PathBuf,
    /// Byte offset of the registration call.
    pub offset: usize,
    pub document: FieldGroupDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub root: PathBuf,
    pub files_examined: usize,
    pub files_total: usize,
    pub elapsed: Duration,
    pub scanned_at: DateTime<Utc>,
    pub cancelled: bool,
    #[serde(default)]
    pub from_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub documents: Vec<ScannedDocument>,
    pub warnings: Vec<ScanWarning>,
    pub metadata: ScanMetadata,
}

impl ScanResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &ScanWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    pub fn find(&self, key: &str) -> impl Iterator<Item = &ScannedDocument> {
        self.documents.iter().filter(move |d| d.document.key == key)
    }
}

/// One warning per key declared more than once, listing every declaring file.
pub(crate) fn duplicate_key_warnings(documents: &[ScannedDocument]) -> Vec<ScanWarning> {
    let mut by_key: FxHashMap<&str, Vec<&Path>> = FxHashMap::default();
    let mut order = Vec::new();
    for doc in documents {
        let files = by_key.entry(doc.document.key.as_str()).or_default();
        if files.is_empty() {
            order.push(doc.document.key.as_str());
        }
        files.push(&doc.file);
    }

    order
        .into_iter()
        .filter_map(|key| {
            let files = by_key.get(key)?;
            if files.len() < 2 {
                return None;
            }
            let listed: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
            Some(ScanWarning {
                files: files.iter().map(|f| f.to_path_buf()).collect(),
                ..ScanWarning::new(
                    WarningKind::DuplicateKey,
                    format!(
                        "field group key '{}' is declared {} times: {}",
                        key,
                        files.len(),
                        listed.join(", ")
                    ),
                )
            })
        })
        .collect()
}
