//! Scanner-specific error types.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal scan errors. Anything that only affects one file or one call site
/// is recorded as a warning on the result instead.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scan root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to read scan root: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid function name: {0:?}")]
    InvalidFunctionName(String),

    #[error("Regex compilation error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(String),
}

impl ScanError {
    pub fn root_not_found(path: impl Into<PathBuf>) -> Self {
        Self::RootNotFound(path.into())
    }

    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::NotADirectory(path.into())
    }

    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_root_not_found() {
        let err = ScanError::root_not_found("/path/to/theme");
        assert!(err.to_string().contains("/path/to/theme"));
    }

    #[test]
    fn test_not_a_directory() {
        let err = ScanError::not_a_directory(Path::new("/path/to/file.php"));
        assert_eq!(err.to_string(), "Path is not a directory: /path/to/file.php");
    }

    #[test]
    fn test_read_error_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ScanError::read_error("/path/to/theme", io_err);
        assert!(err.to_string().contains("/path/to/theme"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = ScanError::invalid_pattern("[", "unclosed character class");
        assert!(err.to_string().contains("'['"));
        assert!(err.to_string().contains("unclosed"));
    }
}
