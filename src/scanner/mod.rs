//! Field group discovery across a directory tree.
//!
//! [`FieldGroupScanner::scan`] walks the root, finds every registration call
//! in every candidate file, and parses and normalizes each argument. Files
//! are processed on a bounded worker pool; the calling thread collects the
//! per-file outcomes, reports progress, and assembles the [`ScanResult`] in
//! walk order.
//!
//! Per-file and per-call failures never abort a scan, they are recorded as
//! [`ScanWarning`]s. Only an unusable root is a [`ScanError`].

pub mod cache;
pub mod call_site;
pub mod error;
pub mod extract;
pub mod filter;
pub mod progress;
pub mod result;
pub mod walker;

pub use cache::{CacheError, ScanCache};
pub use error::ScanError;
pub use extract::{FileOutcome, extract_documents};
pub use filter::{DEFAULT_EXCLUDE, DEFAULT_INCLUDE};
pub use progress::{CancellationToken, ProgressEvent, ProgressSink};
pub use result::{ScanMetadata, ScanResult, ScanWarning, ScannedDocument, WarningKind};

use crate::literal::cursor::{is_ident_byte, is_ident_start};
use crate::normalize::Normalizer;
use chrono::Utc;
use filter::PatternFilter;
use rayon::ThreadPoolBuilder;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

pub const DEFAULT_FUNCTION_NAME: &str = "acf_add_local_field_group";

/// What to scan.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub root: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Skip the cache lookup; the fresh result is still stored.
    pub force_refresh: bool,
}

impl ScanRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include: DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect(),
            exclude: DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect(),
            force_refresh: false,
        }
    }

    pub fn with_include(mut self, include: Vec<String>) -> Self {
        self.include = include;
        self
    }

    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }
}

pub struct FieldGroupScanner {
    function_name: String,
    jobs: Option<usize>,
    normalizer: Normalizer,
    cache: Option<Arc<ScanCache>>,
    progress: Option<Arc<dyn ProgressSink>>,
    cancel: CancellationToken,
}

impl FieldGroupScanner {
    pub fn new() -> Self {
        Self {
            function_name: DEFAULT_FUNCTION_NAME.to_string(),
            jobs: None,
            normalizer: Normalizer::new(),
            cache: None,
            progress: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = name.into();
        self
    }

    /// Worker count; defaults to the available parallelism.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs.max(1));
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_cache(mut self, cache: Arc<ScanCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn scan(&self, request: &ScanRequest) -> Result<ScanResult, ScanError> {
        let started = Instant::now();
        let prefilter = self.prefilter()?;
        let root = resolve_root(&request.root)?;
        let filter = PatternFilter::new(&root, &request.include, &request.exclude)?;
        let walk = walker::collect_files(&root, &filter);

        let fingerprint = self
            .cache
            .as_ref()
            .map(|_| cache::fingerprint(&root, &walk.files, &self.settings_key(request)));

        if let (Some(cache), Some(fp)) = (&self.cache, &fingerprint) {
            if request.force_refresh {
                debug!(root = %root.display(), "Cache bypassed");
            } else if let Some(mut hit) = cache.lookup(&root, fp) {
                hit.metadata.from_cache = true;
                info!(
                    root = %root.display(),
                    documents = hit.documents.len(),
                    "Served scan from cache"
                );
                return Ok(hit);
            }
        }

        let files_total = walk.files.len();
        let outcomes = self.process(&root, &walk.files, &prefilter)?;
        let files_examined = outcomes.iter().filter(|o| o.is_some()).count();

        let mut documents = Vec::new();
        let mut warnings = walk.warnings;
        for outcome in outcomes.into_iter().flatten() {
            documents.extend(outcome.documents);
            warnings.extend(outcome.warnings);
        }
        let duplicates = result::duplicate_key_warnings(&documents);
        for w in &duplicates {
            warn!("{}", w.message);
        }
        warnings.extend(duplicates);

        let cancelled = self.cancel.is_cancelled();
        let result = ScanResult {
            documents,
            warnings,
            metadata: ScanMetadata {
                root: root.clone(),
                files_examined,
                files_total,
                elapsed: started.elapsed(),
                scanned_at: Utc::now(),
                cancelled,
                from_cache: false,
            },
        };
        info!(
            root = %root.display(),
            files = files_examined,
            documents = result.documents.len(),
            warnings = result.warnings.len(),
            cancelled,
            "Scan finished"
        );

        if let (Some(cache), Some(fp)) = (&self.cache, fingerprint) {
            if cancelled {
                debug!(root = %root.display(), "Cancelled scan not cached");
            } else {
                cache.store(&root, fp, result.clone());
            }
        }
        Ok(result)
    }

    /// Extract field groups from one file's text, outside of any directory scan.
    pub fn scan_source(&self, path: &Path, source: &str) -> FileOutcome {
        extract_documents(path, source, &self.function_name, &self.normalizer)
    }

    fn process(
        &self,
        root: &Path,
        files: &[PathBuf],
        prefilter: &Regex,
    ) -> Result<Vec<Option<FileOutcome>>, ScanError> {
        let jobs = self.jobs.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        let pool = ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|i| format!("acf-scan-{}", i))
            .build()
            .map_err(|e| ScanError::ThreadPool(e.to_string()))?;
        debug!(jobs, files = files.len(), "Scanning files");

        let files_total = files.len();
        let mut outcomes: Vec<Option<FileOutcome>> = (0..files_total).map(|_| None).collect();
        let mut files_examined = 0;
        let mut documents_found = 0;
        let (tx, rx) = mpsc::channel::<(usize, FileOutcome)>();
        let pool = &pool;

        thread::scope(|scope| {
            scope.spawn(move || {
                pool.scope_fifo(|s| {
                    for (index, path) in files.iter().enumerate() {
                        let tx = tx.clone();
                        s.spawn_fifo(move |_| {
                            if self.cancel.is_cancelled() {
                                trace!(path = %path.display(), "Skipped after cancellation");
                                return;
                            }
                            let outcome = self.scan_file(root, path, prefilter);
                            let _ = tx.send((index, outcome));
                        });
                    }
                });
            });

            for (index, outcome) in rx {
                files_examined += 1;
                documents_found += outcome.documents.len();
                outcomes[index] = Some(outcome);
                if let Some(sink) = &self.progress {
                    sink.on_progress(ProgressEvent {
                        files_examined,
                        files_total,
                        documents_found,
                    });
                }
            }
        });

        if let Some(sink) = &self.progress {
            sink.on_finish();
        }
        Ok(outcomes)
    }

    fn scan_file(&self, root: &Path, path: &Path, prefilter: &Regex) -> FileOutcome {
        let relative = path.strip_prefix(root).unwrap_or(path);
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read file");
                return FileOutcome {
                    documents: Vec::new(),
                    warnings: vec![ScanWarning::in_file(
                        WarningKind::Io,
                        relative,
                        format!("cannot read file: {}", e),
                    )],
                };
            }
        };
        if !prefilter.is_match(&source) {
            trace!(path = %path.display(), "No registration call");
            return FileOutcome::default();
        }
        extract_documents(relative, &source, &self.function_name, &self.normalizer)
    }

    /// Cheap whole-file test before the PHP-aware search.
    fn prefilter(&self) -> Result<Regex, ScanError> {
        let name = &self.function_name;
        let valid = name.bytes().next().is_some_and(is_ident_start) && name.bytes().all(is_ident_byte);
        if !valid {
            return Err(ScanError::InvalidFunctionName(name.clone()));
        }
        Ok(Regex::new(&format!(r"(?i)\b{}\b", regex::escape(name)))?)
    }

    /// Everything besides the files that changes what a scan produces.
    fn settings_key(&self, request: &ScanRequest) -> String {
        format!(
            "function={}\ninclude={}\nexclude={}\nnumeric={}",
            self.function_name,
            request.include.join(","),
            request.exclude.join(","),
            self.normalizer.numeric_settings().join(",")
        )
    }
}

impl Default for FieldGroupScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    let meta = fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ScanError::root_not_found(root),
        _ => ScanError::read_error(root, e),
    })?;
    if !meta.is_dir() {
        return Err(ScanError::not_a_directory(root));
    }
    fs::read_dir(root).map_err(|e| ScanError::read_error(root, e))?;
    root.canonicalize().map_err(|e| ScanError::read_error(root, e))
}
