//! Normalization error types.

use thiserror::Error;

/// A parsed literal that cannot be turned into a field group.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("field group must be an associative array, found {0}")]
    NotAMap(&'static str),

    #[error("missing required key '{0}'")]
    MissingKey(String),

    #[error("'{key}' must be {expected}, found {found}")]
    InvalidType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl NormalizationError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingKey(key.into())
    }

    pub fn invalid_type(key: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self::InvalidType {
            key: key.into(),
            expected,
            found,
        }
    }
}
