//! Configuration loading functions.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::error::ConfigError;
use super::types::Config;

/// Project-level file names, in search order.
pub const PROJECT_CONFIG_FILES: &[&str] = &[
    ".acf-sync.yaml",
    ".acf-sync.yml",
    ".acf-sync.json",
    ".acf-sync.toml",
];

impl Config {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseYaml {
                path: path.to_path_buf(),
                source: e,
            }),
            "json" => serde_json::from_str(&content).map_err(|e| ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: e,
            }),
            "toml" => toml::from_str(&content).map_err(|e| ConfigError::ParseToml {
                path: path.to_path_buf(),
                source: e,
            }),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf(), ext)),
        }
    }

    /// Load configuration from the project directory or global config.
    ///
    /// Search order:
    /// 1. `.acf-sync.yaml`, `.acf-sync.yml`, `.acf-sync.json`, `.acf-sync.toml`
    ///    in the project root
    /// 2. `~/.config/acf-sync/config.yaml`
    /// 3. Default configuration
    ///
    /// A file that exists but does not parse is logged and skipped.
    pub fn load(project_root: Option<&Path>) -> Self {
        if let Some(root) = project_root {
            for filename in PROJECT_CONFIG_FILES {
                let path = root.join(filename);
                if path.exists()
                    && let Some(config) = Self::try_load(&path)
                {
                    return config;
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let global_config = config_dir.join("acf-sync").join("config.yaml");
            if global_config.exists()
                && let Some(config) = Self::try_load(&global_config)
            {
                return config;
            }
        }

        Self::default()
    }

    fn try_load(path: &Path) -> Option<Self> {
        match Self::from_file(path) {
            Ok(config) => {
                debug!(path = %path.display(), "Loaded config");
                Some(config)
            }
            Err(e) => {
                warn!(error = %e, "Ignoring config file");
                None
            }
        }
    }
}
