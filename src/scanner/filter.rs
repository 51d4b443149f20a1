//! Include/exclude glob matching, gitignore syntax.

use super::error::ScanError;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

pub const DEFAULT_INCLUDE: &[&str] = &["*.php"];
pub const DEFAULT_EXCLUDE: &[&str] = &["vendor/", "node_modules/", ".git/"];

/// Patterns are matched against paths relative to the scan root.
pub struct PatternFilter {
    include: Gitignore,
    exclude: Gitignore,
}

impl PatternFilter {
    pub fn new(root: &Path, include: &[String], exclude: &[String]) -> Result<Self, ScanError> {
        Ok(Self {
            include: build(root, include)?,
            exclude: build(root, exclude)?,
        })
    }

    /// Directories are checked before descending, so their contents are never read.
    pub fn is_excluded(&self, relative: &Path, is_dir: bool) -> bool {
        !relative.as_os_str().is_empty() && self.exclude.matched(relative, is_dir).is_ignore()
    }

    pub fn is_included(&self, relative: &Path) -> bool {
        !relative.as_os_str().is_empty()
            && !relative.has_root()
            && self
                .include
                .matched_path_or_any_parents(relative, false)
                .is_ignore()
    }
}

fn build(root: &Path, patterns: &[String]) -> Result<Gitignore, ScanError> {
    let mut builder = GitignoreBuilder::new(root);
    for pattern in patterns {
        builder
            .add_line(None, pattern)
            .map_err(|e| ScanError::invalid_pattern(pattern, e.to_string()))?;
    }
    builder
        .build()
        .map_err(|e| ScanError::invalid_pattern(patterns.join(", "), e.to_string()))
}
