//! Machine-readable scan report.
//!
//! Documents are rendered in their local-JSON form, the same shape the
//! `to-json` command writes, so the report can be fed back into `to-php`.

use crate::convert::value_to_json;
use crate::normalize::Representation;
use crate::reporter::Reporter;
use crate::scanner::{ScanResult, ScanWarning, ScannedDocument};
use serde::Serialize;
use std::path::Path;

pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct Report<'a> {
    root: &'a Path,
    scanned_at: String,
    elapsed_ms: u128,
    files_examined: usize,
    files_total: usize,
    cancelled: bool,
    from_cache: bool,
    documents: Vec<DocumentEntry<'a>>,
    warnings: &'a [ScanWarning],
}

#[derive(Serialize)]
struct DocumentEntry<'a> {
    file: &'a Path,
    offset: usize,
    group: serde_json::Value,
}

impl<'a> From<&'a ScannedDocument> for DocumentEntry<'a> {
    fn from(scanned: &'a ScannedDocument) -> Self {
        Self {
            file: &scanned.file,
            offset: scanned.offset,
            group: value_to_json(&scanned.document.to_value(Representation::Json)),
        }
    }
}

impl Reporter for JsonReporter {
    fn report(&self, result: &ScanResult) -> String {
        let meta = &result.metadata;
        let report = Report {
            root: &meta.root,
            scanned_at: meta.scanned_at.to_rfc3339(),
            elapsed_ms: meta.elapsed.as_millis(),
            files_examined: meta.files_examined,
            files_total: meta.files_total,
            cancelled: meta.cancelled,
            from_cache: meta.from_cache,
            documents: result.documents.iter().map(DocumentEntry::from).collect(),
            warnings: &result.warnings,
        };
        serde_json::to_string_pretty(&report)
            .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize result: {}"}}"#, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::WarningKind;
    use crate::test_utils::fixtures::{create_test_result, hero_group};

    #[test]
    fn test_json_output_structure() {
        let reporter = JsonReporter::new();
        let result = create_test_result(vec![], vec![]);
        let output = reporter.report(&result);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["root"], "/srv/www/theme");
        assert_eq!(parsed["files_examined"], 3);
        assert_eq!(parsed["cancelled"], false);
        assert_eq!(parsed["elapsed_ms"], 12);
        assert!(parsed["documents"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_json_output_with_documents() {
        let reporter = JsonReporter::new();
        let result = create_test_result(vec![hero_group()], vec![]);
        let output = reporter.report(&result);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        let entry = &parsed["documents"][0];
        assert_eq!(entry["file"], "inc/acf.php");
        assert_eq!(entry["offset"], 120);
        assert_eq!(entry["group"]["key"], "group_hero");
        assert_eq!(entry["group"]["fields"][1]["type"], "image");

        let keys: Vec<&String> = entry["group"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["key", "title", "fields"]);
    }

    #[test]
    fn test_json_output_with_warnings() {
        let reporter = JsonReporter::new();
        let warning = ScanWarning::new(WarningKind::Io, "permission denied");
        let result = create_test_result(vec![], vec![warning]);
        let output = reporter.report(&result);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["warnings"][0]["kind"], "io");
        assert_eq!(parsed["warnings"][0]["message"], "permission denied");
        assert!(parsed["warnings"][0].get("file").is_none());
    }
}
