use crate::config::ConfigError;
use crate::convert::ConversionError;
use crate::literal::ParseError;
use crate::normalize::NormalizationError;
use crate::scanner::{CacheError, ScanError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AcfError {
    #[error("Failed to read file: {}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, AcfError>;
