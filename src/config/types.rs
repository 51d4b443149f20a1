//! Configuration type definitions.

use crate::emit::ArrayStyle;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for acf-sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan configuration.
    pub scan: ScanConfig,
    /// PHP output formatting.
    pub emit: EmitConfig,
    /// Scan result cache.
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Files to scan, gitignore syntax. Empty means `*.php`.
    pub include: Vec<String>,
    /// Extra exclusions on top of `vendor/`, `node_modules/` and `.git/`.
    pub exclude: Vec<String>,
    /// Registration function to look for.
    pub function_name: Option<String>,
    /// Worker threads.
    pub jobs: Option<usize>,
    /// Extra settings whose numeric strings become numbers.
    pub numeric_settings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    /// One level of indentation, a tab by default.
    pub indent: Option<String>,
    pub array_style: Option<ArrayStyle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Where to persist scan results between runs.
    pub path: Option<PathBuf>,
}
