//! Effective configuration after merging CLI and config file.

use super::types::Config;
use crate::cli::{ScanArgs, ToJsonArgs, ToPhpArgs};
use crate::emit::{ArrayStyle, EmitOptions};
use crate::normalize::Normalizer;
use crate::scanner::{
    DEFAULT_EXCLUDE, DEFAULT_FUNCTION_NAME, DEFAULT_INCLUDE, FieldGroupScanner, ScanRequest,
};
use std::path::PathBuf;

/// Settings after merging.
///
/// - Include patterns: CLI replaces config, config replaces `*.php`
/// - Exclude patterns: defaults, then config, then CLI, all applied
/// - Everything else: CLI takes precedence, fallback to config, then default
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub function_name: String,
    pub jobs: Option<usize>,
    pub numeric_settings: Vec<String>,
    pub cache_path: Option<PathBuf>,
    pub emit: EmitOptions,
}

impl EffectiveConfig {
    pub fn from_config(config: &Config) -> Self {
        let include = if config.scan.include.is_empty() {
            DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect()
        } else {
            config.scan.include.clone()
        };
        let mut exclude: Vec<String> = DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect();
        exclude.extend(config.scan.exclude.iter().cloned());

        let defaults = EmitOptions::default();
        Self {
            include,
            exclude,
            function_name: config
                .scan
                .function_name
                .clone()
                .unwrap_or_else(|| DEFAULT_FUNCTION_NAME.to_string()),
            jobs: config.scan.jobs,
            numeric_settings: config.scan.numeric_settings.clone(),
            cache_path: config.cache.path.clone(),
            emit: EmitOptions {
                indent: config.emit.indent.clone().unwrap_or(defaults.indent),
                array_style: config.emit.array_style.unwrap_or(defaults.array_style),
            },
        }
    }

    pub fn with_scan_args(mut self, args: &ScanArgs) -> Self {
        if !args.include.is_empty() {
            self.include = args.include.clone();
        }
        self.exclude.extend(args.exclude.iter().cloned());
        if let Some(name) = &args.function_name {
            self.function_name = name.clone();
        }
        if args.jobs.is_some() {
            self.jobs = args.jobs;
        }
        if args.cache.is_some() {
            self.cache_path = args.cache.clone();
        }
        self
    }

    pub fn with_to_php_args(mut self, args: &ToPhpArgs) -> Self {
        if let Some(name) = &args.function_name {
            self.function_name = name.clone();
        }
        if args.short_arrays {
            self.emit.array_style = ArrayStyle::Short;
        }
        self
    }

    pub fn with_to_json_args(mut self, args: &ToJsonArgs) -> Self {
        if let Some(name) = &args.function_name {
            self.function_name = name.clone();
        }
        self
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new().with_numeric_settings(self.numeric_settings.iter().cloned())
    }

    /// Scanner without cache, progress or cancellation attached.
    pub fn scanner(&self) -> FieldGroupScanner {
        let scanner = FieldGroupScanner::new()
            .with_function_name(self.function_name.clone())
            .with_normalizer(self.normalizer());
        match self.jobs {
            Some(jobs) => scanner.with_jobs(jobs),
            None => scanner,
        }
    }

    pub fn scan_request(&self, root: impl Into<PathBuf>) -> ScanRequest {
        ScanRequest::new(root)
            .with_include(self.include.clone())
            .with_exclude(self.exclude.clone())
    }
}
