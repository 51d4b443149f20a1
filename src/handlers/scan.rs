//! Scan mode handler.

use super::{HandlerResult, load_config, write_documents};
use crate::cli::{Cli, OutputFormat, ScanArgs};
use crate::config::EffectiveConfig;
use crate::reporter::{Reporter, json::JsonReporter, progress::ScanProgress, terminal::TerminalReporter};
use crate::scanner::{ScanCache, ScanResult};
use std::io::{self, IsTerminal};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub fn handle_scan(cli: &Cli, args: &ScanArgs) -> HandlerResult {
    info!(root = %args.root.display(), "Starting scan");
    let config = match load_config(cli.config.as_deref(), &args.root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return HandlerResult::FATAL;
        }
    };
    let effective = EffectiveConfig::from_config(&config).with_scan_args(args);

    let cache = effective.cache_path.as_ref().map(|p| Arc::new(ScanCache::open(p)));
    let progress = Arc::new(ScanProgress::new(io::stderr().is_terminal(), args.ci));

    let mut scanner = effective.scanner().with_progress(progress);
    if let Some(cache) = &cache {
        scanner = scanner.with_cache(Arc::clone(cache));
    }
    let request = effective
        .scan_request(&args.root)
        .with_force_refresh(args.force_refresh);

    let result = match scanner.scan(&request) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return HandlerResult::FATAL;
        }
    };

    if let Some(cache) = &cache
        && let Err(e) = cache.save()
    {
        warn!(error = %e, "Failed to save scan cache");
    }

    if let Some(out_dir) = &args.out_dir {
        match write_documents(out_dir, result.documents.iter().map(|d| &d.document)) {
            Ok(written) => {
                if args.format == OutputFormat::Terminal {
                    println!("Wrote {} field groups to {}", written.len(), out_dir.display());
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return HandlerResult::FATAL;
            }
        }
    }

    println!("{}", format_result(cli, args, &result));
    debug!(
        documents = result.documents.len(),
        warnings = result.warnings.len(),
        "Scan completed"
    );

    exit_status(args.strict, &result)
}

fn format_result(cli: &Cli, args: &ScanArgs, result: &ScanResult) -> String {
    match args.format {
        OutputFormat::Terminal => TerminalReporter::new(args.strict, cli.verbose).report(result),
        OutputFormat::Json => JsonReporter::new().report(result),
    }
}

/// Warnings only fail the run in strict mode.
fn exit_status(strict: bool, result: &ScanResult) -> HandlerResult {
    if strict && result.has_warnings() {
        HandlerResult::WARNINGS
    } else {
        HandlerResult::Success
    }
}
