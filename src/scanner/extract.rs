//! Field groups from the text of one PHP file.

use super::call_site::{CallSite, find_call_sites};
use super::result::{ScanWarning, ScannedDocument, WarningKind};
use crate::literal::parser::at_long_array;
use crate::literal::{Cursor, parse_literal};
use crate::normalize::Normalizer;
use std::path::Path;
use tracing::{trace, warn};

/// What one file contributed to a scan.
#[derive(Debug, Default)]
pub struct FileOutcome {
    pub documents: Vec<ScannedDocument>,
    pub warnings: Vec<ScanWarning>,
}

/// Every registration call in `source`. A failing call site becomes a
/// warning and the remaining ones are still processed.
pub fn extract_documents(
    path: &Path,
    source: &str,
    function_name: &str,
    normalizer: &Normalizer,
) -> FileOutcome {
    let mut outcome = FileOutcome::default();
    for site in find_call_sites(source, function_name) {
        match extract_one(path, source, &site, normalizer, &mut outcome.warnings) {
            Some(doc) => outcome.documents.push(doc),
            None => trace!(path = %path.display(), offset = site.offset, "Call site skipped"),
        }
    }
    for w in &outcome.warnings {
        warn!(path = %path.display(), offset = ?w.offset, kind = %w.kind, "{}", w.message);
    }
    outcome
}

fn extract_one(
    path: &Path,
    source: &str,
    site: &CallSite,
    normalizer: &Normalizer,
    warnings: &mut Vec<ScanWarning>,
) -> Option<ScannedDocument> {
    let span = match &site.argument {
        Ok(span) => span.clone(),
        Err(e) => {
            warnings.push(ScanWarning::at(
                WarningKind::Parse,
                path,
                e.offset,
                format!("cannot delimit call argument: {}", e.kind),
            ));
            return None;
        }
    };

    let cursor = Cursor::new(source, span.start);
    if span.is_empty() || !(cursor.peek() == Some(b'[') || at_long_array(&cursor)) {
        warnings.push(ScanWarning::at(
            WarningKind::NotALiteral,
            path,
            span.start,
            format!("argument is not an array literal: `{}`", snippet(&source[span])),
        ));
        return None;
    }

    let parsed = match parse_literal(source, span.start) {
        Ok(parsed) => parsed,
        Err(e) => {
            warnings.push(ScanWarning::at(WarningKind::Parse, path, e.offset, e.kind.to_string()));
            return None;
        }
    };

    let mut rest = Cursor::new(source, parsed.end);
    if rest.skip_trivia().is_err() || rest.pos() < span.end {
        warnings.push(ScanWarning::at(
            WarningKind::TrailingInput,
            path,
            parsed.end,
            format!(
                "unexpected input after array literal: `{}`",
                snippet(&source[parsed.end.min(span.end)..span.end])
            ),
        ));
        return None;
    }

    let normalized = match normalizer.normalize(&parsed.value) {
        Ok(normalized) => normalized,
        Err(e) => {
            warnings.push(ScanWarning::at(
                WarningKind::Normalization,
                path,
                site.offset,
                e.to_string(),
            ));
            return None;
        }
    };
    for w in &normalized.warnings {
        warnings.push(ScanWarning::at(
            WarningKind::SynthesizedKey,
            path,
            site.offset,
            w.to_string(),
        ));
    }

    Some(ScannedDocument {
        file: path.to_path_buf(),
        offset: site.offset,
        document: normalized.document,
    })
}

/// First line of `text`, cut to 40 characters.
fn snippet(text: &str) -> String {
    let line = text.trim().lines().next().unwrap_or_default();
    let mut out: String = line.chars().take(40).collect();
    if out.len() < line.len() {
        out.push_str("...");
    }
    out
}
