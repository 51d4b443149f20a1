//! Configuration loading and merging.
//!
//! ## Layers
//! - `types`: Configuration type definitions
//! - `loading`: File loading logic and search order
//! - `effective`: CLI + config merging

mod effective;
mod error;
mod loading;
mod types;

pub use effective::EffectiveConfig;
pub use error::ConfigError;
pub use loading::PROJECT_CONFIG_FILES;
pub use types::{CacheConfig, Config, EmitConfig, ScanConfig};
