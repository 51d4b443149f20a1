use crate::reporter::Reporter;
use crate::scanner::{ScanResult, ScanWarning, ScannedDocument, WarningKind};
use colored::Colorize;

pub struct TerminalReporter {
    strict: bool,
    verbose: bool,
}

impl TerminalReporter {
    pub fn new(strict: bool, verbose: bool) -> Self {
        Self { strict, verbose }
    }

    fn kind_label(&self, kind: WarningKind) -> colored::ColoredString {
        let label = format!("[{}]", kind);
        match kind {
            WarningKind::Io | WarningKind::Parse => label.red().bold(),
            WarningKind::NotALiteral | WarningKind::TrailingInput => label.yellow(),
            WarningKind::Normalization | WarningKind::DuplicateKey => label.yellow().bold(),
            WarningKind::SynthesizedKey => label.cyan(),
        }
    }

    fn format_document(&self, scanned: &ScannedDocument) -> String {
        let doc = &scanned.document;
        let mut output = format!(
            "  {} {} ({} {})\n",
            doc.key.bold(),
            doc.title_text().green(),
            doc.field_count(),
            if doc.field_count() == 1 { "field" } else { "fields" }
        );
        output.push_str(&format!(
            "    {}\n",
            format!("{}@{}", scanned.file.display(), scanned.offset).dimmed()
        ));

        if self.verbose {
            for field in &doc.fields {
                output.push_str(&format!(
                    "    - {} {} {}\n",
                    field.name.cyan(),
                    format!("<{}>", field.field_type).dimmed(),
                    field.key
                ));
            }
        }
        output
    }

    fn format_warning(&self, warning: &ScanWarning) -> String {
        let mut output = format!("  {} {}\n", self.kind_label(warning.kind), warning);
        if warning.kind == WarningKind::DuplicateKey {
            for file in &warning.files {
                output.push_str(&format!("    {} {}\n", "-".dimmed(), file.display()));
            }
        }
        output
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, result: &ScanResult) -> String {
        let mut output = String::new();
        let meta = &result.metadata;

        output.push_str(&format!(
            "{} {}\n\n",
            "acf-sync scan:".bold(),
            meta.root.display()
        ));

        if result.documents.is_empty() {
            output.push_str(&format!("{}\n\n", "No field groups found.".yellow()));
        } else {
            output.push_str(&format!("{}\n", "Field groups".bold().underline()));
            for scanned in &result.documents {
                output.push_str(&self.format_document(scanned));
            }
            output.push('\n');
        }

        if result.has_warnings() {
            output.push_str(&format!("{}\n", "Warnings".bold().underline()));
            for warning in &result.warnings {
                output.push_str(&self.format_warning(warning));
            }
            output.push('\n');
        }

        output.push_str(&"━".repeat(50));
        output.push('\n');

        let mut notes = Vec::new();
        if meta.from_cache {
            notes.push("cached".cyan().to_string());
        }
        if meta.cancelled {
            notes.push("cancelled".red().to_string());
        }
        output.push_str(&format!(
            "Scanned {}/{} files in {:.2?}: {} field groups, {} warnings{}\n",
            meta.files_examined,
            meta.files_total,
            meta.elapsed,
            result.documents.len(),
            result.warnings.len(),
            if notes.is_empty() {
                String::new()
            } else {
                format!(" ({})", notes.join(", "))
            }
        ));

        let failed = meta.cancelled || (self.strict && result.has_warnings());
        let status = if failed { "FAIL".red().bold() } else { "OK".green().bold() };
        output.push_str(&format!("Result: {}\n", status));

        output
    }
}
