//! Candidate file discovery.

use super::filter::PatternFilter;
use super::result::{ScanWarning, WarningKind};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

/// Canonical paths of directories already entered, so a directory reached
/// through several links (or through a link back to an ancestor) is only
/// walked once.
#[derive(Debug, Default)]
struct VisitedDirs {
    paths: FxHashSet<PathBuf>,
}

impl VisitedDirs {
    /// `false` when the directory was seen before or cannot be resolved.
    fn first_visit(&mut self, path: &Path) -> bool {
        match path.canonicalize() {
            Ok(canonical) => self.paths.insert(canonical),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Cannot resolve directory");
                false
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct WalkOutput {
    /// Files in walk order (sorted by file name within each directory).
    pub files: Vec<PathBuf>,
    pub warnings: Vec<ScanWarning>,
}

/// Walk `root` recursively, following links, and collect the files that
/// pass `filter`.
pub fn collect_files(root: &Path, filter: &PatternFilter) -> WalkOutput {
    let mut output = WalkOutput::default();
    let mut visited = VisitedDirs::default();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| keep_entry(root, entry, filter, &mut visited));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                if e.loop_ancestor().is_some() {
                    debug!(error = %e, "Skipping symlink cycle");
                    continue;
                }
                let path = e.path().map(Path::to_path_buf);
                let message = e.to_string();
                output.warnings.push(match path {
                    Some(path) => ScanWarning::in_file(WarningKind::Io, relative_to(root, &path), message),
                    None => ScanWarning::new(WarningKind::Io, message),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let relative = relative_to(root, entry.path());
        if filter.is_included(relative) {
            trace!(path = %entry.path().display(), "Candidate file");
            output.files.push(entry.into_path());
        }
    }

    debug!(
        root = %root.display(),
        files = output.files.len(),
        warnings = output.warnings.len(),
        "Collected candidate files"
    );
    output
}

fn keep_entry(root: &Path, entry: &DirEntry, filter: &PatternFilter, visited: &mut VisitedDirs) -> bool {
    if entry.depth() == 0 {
        visited.first_visit(entry.path());
        return true;
    }
    let is_dir = entry.file_type().is_dir();
    if filter.is_excluded(relative_to(root, entry.path()), is_dir) {
        debug!(path = %entry.path().display(), "Excluded");
        return false;
    }
    if is_dir && !visited.first_visit(entry.path()) {
        debug!(path = %entry.path().display(), "Directory already visited");
        return false;
    }
    true
}

fn relative_to<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::filter::{DEFAULT_EXCLUDE, DEFAULT_INCLUDE};
    use std::fs;
    use tempfile::TempDir;

    fn default_filter(root: &Path) -> PatternFilter {
        let include: Vec<String> = DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect();
        let exclude: Vec<String> = DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect();
        PatternFilter::new(root, &include, &exclude).unwrap()
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| relative_to(root, f).to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_collects_php_files_in_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("inc/acf")).unwrap();
        fs::write(root.join("functions.php"), "<?php").unwrap();
        fs::write(root.join("b.php"), "<?php").unwrap();
        fs::write(root.join("style.css"), "").unwrap();
        fs::write(root.join("inc/acf/groups.php"), "<?php").unwrap();

        let output = collect_files(root, &default_filter(root));
        assert!(output.warnings.is_empty());
        assert_eq!(
            names(root, &output.files),
            vec!["b.php", "functions.php", "inc/acf/groups.php"]
        );
    }

    #[test]
    fn test_excluded_directories_are_skipped() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("vendor/acme")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("vendor/acme/lib.php"), "<?php").unwrap();
        fs::write(root.join("node_modules/pkg/x.php"), "<?php").unwrap();
        fs::write(root.join("theme.php"), "<?php").unwrap();

        let output = collect_files(root, &default_filter(root));
        assert_eq!(names(root, &output.files), vec!["theme.php"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_is_skipped() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("inc")).unwrap();
        fs::write(root.join("inc/groups.php"), "<?php").unwrap();
        std::os::unix::fs::symlink(root, root.join("inc/loop")).unwrap();

        let output = collect_files(root, &default_filter(root));
        assert_eq!(names(root, &output.files), vec!["inc/groups.php"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_linked_twice_walked_once() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("real")).unwrap();
        fs::write(root.join("real/groups.php"), "<?php").unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("alias")).unwrap();

        let output = collect_files(root, &default_filter(root));
        // "alias" sorts first and claims the directory
        assert_eq!(names(root, &output.files), vec!["alias/groups.php"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_link_becomes_warning() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("ok.php"), "<?php").unwrap();
        std::os::unix::fs::symlink(root.join("missing.php"), root.join("broken.php")).unwrap();

        let output = collect_files(root, &default_filter(root));
        assert_eq!(names(root, &output.files), vec!["ok.php"]);
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].kind, WarningKind::Io);
    }
}
