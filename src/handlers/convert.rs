//! `to-php` and `to-json` handlers.

use super::{HandlerResult, load_config, write_documents};
use crate::cli::{Cli, ToJsonArgs, ToPhpArgs};
use crate::config::EffectiveConfig;
use crate::convert::{document_to_json, documents_from_json_with, documents_to_json};
use crate::emit::{emit_document, emit_registration_call};
use crate::error::{AcfError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub fn handle_to_php(cli: &Cli, args: &ToPhpArgs) -> HandlerResult {
    let config = match load_config(cli.config.as_deref(), Path::new(".")) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return HandlerResult::FATAL;
        }
    };
    let effective = EffectiveConfig::from_config(&config).with_to_php_args(args);

    let mut failed = 0;
    for path in &args.files {
        match convert_to_php(path, args.wrap, &effective) {
            Ok(php) => print!("{}", php),
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        eprintln!("{} of {} files failed", failed, args.files.len());
        HandlerResult::FATAL
    } else {
        HandlerResult::Success
    }
}

/// PHP for every group in one JSON file, one block per group.
fn convert_to_php(path: &Path, wrap: bool, effective: &EffectiveConfig) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|e| AcfError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let documents = documents_from_json_with(&effective.normalizer(), &text)?;
    debug!(path = %path.display(), groups = documents.len(), "Converting to PHP");

    let mut out = String::new();
    for doc in &documents {
        if wrap {
            out.push_str(&emit_registration_call(doc, &effective.function_name, &effective.emit));
        } else {
            out.push_str(&emit_document(doc, &effective.emit));
            out.push('\n');
        }
    }
    Ok(out)
}

pub fn handle_to_json(cli: &Cli, args: &ToJsonArgs) -> HandlerResult {
    let project_root = args.file.parent().unwrap_or(Path::new("."));
    let config = match load_config(cli.config.as_deref(), project_root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return HandlerResult::FATAL;
        }
    };
    let effective = EffectiveConfig::from_config(&config).with_to_json_args(args);

    match convert_to_json(args, &effective) {
        Ok(warnings) => {
            for warning in &warnings {
                eprintln!("warning: {}", warning);
            }
            HandlerResult::Success
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            HandlerResult::FATAL
        }
    }
}

/// Returns the per-call warnings; the groups go to stdout or `--out-dir`.
fn convert_to_json(args: &ToJsonArgs, effective: &EffectiveConfig) -> Result<Vec<String>> {
    let source = fs::read_to_string(&args.file).map_err(|e| AcfError::ReadError {
        path: args.file.clone(),
        source: e,
    })?;
    let outcome = effective.scanner().scan_source(&args.file, &source);
    let documents: Vec<_> = outcome.documents.into_iter().map(|d| d.document).collect();
    info!(path = %args.file.display(), groups = documents.len(), "Converted to JSON");

    match (&args.out_dir, documents.as_slice()) {
        (Some(out_dir), docs) => {
            write_documents(out_dir, docs)?;
        }
        (None, [doc]) => print!("{}", document_to_json(doc)),
        (None, docs) => print!("{}", documents_to_json(docs)),
    }
    Ok(outcome.warnings.iter().map(|w| w.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Command;
    use crate::config::Config;
    use clap::Parser;
    use tempfile::TempDir;

    const GROUP_JSON: &str = r#"{"key": "group_1", "title": "Hero", "fields": []}"#;

    #[test]
    fn test_convert_to_php_plain_and_wrapped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("group_1.json");
        fs::write(&path, GROUP_JSON).unwrap();
        let effective = EffectiveConfig::from_config(&Config::default());

        let plain = convert_to_php(&path, false, &effective).unwrap();
        assert!(plain.starts_with("array("));
        assert!(plain.contains("'key' => 'group_1'"));

        let wrapped = convert_to_php(&path, true, &effective).unwrap();
        assert!(wrapped.starts_with("acf_add_local_field_group( array("));
        assert!(wrapped.ends_with(" );\n"));
    }

    #[test]
    fn test_convert_to_php_errors() {
        let dir = TempDir::new().unwrap();
        let effective = EffectiveConfig::from_config(&Config::default());

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            convert_to_php(&missing, false, &effective),
            Err(AcfError::ReadError { .. })
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{not json").unwrap();
        assert!(matches!(
            convert_to_php(&bad, false, &effective),
            Err(AcfError::Conversion(_))
        ));
    }

    #[test]
    fn test_handle_to_php_any_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        fs::write(&good, GROUP_JSON).unwrap();
        fs::write(&bad, "[1]").unwrap();

        let cli = Cli::try_parse_from([
            "acf-sync",
            "to-php",
            good.to_str().unwrap(),
            bad.to_str().unwrap(),
        ])
        .unwrap();
        let Command::ToPhp(args) = &cli.command else {
            panic!("expected to-php");
        };
        assert_eq!(handle_to_php(&cli, args), HandlerResult::Error(2));
    }

    #[test]
    fn test_convert_to_json_out_dir() {
        let dir = TempDir::new().unwrap();
        let php = dir.path().join("groups.php");
        fs::write(
            &php,
            "<?php\nacf_add_local_field_group(array('key' => 'group_a', 'title' => 'A'));\n\
             acf_add_local_field_group(array('key' => 'group_b', 'title' => 'B'));\n",
        )
        .unwrap();
        let out = dir.path().join("out");
        let args = ToJsonArgs {
            file: php,
            out_dir: Some(out.clone()),
            function_name: None,
        };

        let warnings = convert_to_json(&args, &EffectiveConfig::from_config(&Config::default())).unwrap();
        assert!(warnings.is_empty());
        assert!(out.join("group_a.json").exists());
        assert!(out.join("group_b.json").exists());
    }

    #[test]
    fn test_convert_to_json_missing_file() {
        let args = ToJsonArgs {
            file: "/nonexistent/groups.php".into(),
            out_dir: None,
            function_name: None,
        };
        assert!(matches!(
            convert_to_json(&args, &EffectiveConfig::from_config(&Config::default())),
            Err(AcfError::ReadError { .. })
        ));
    }
}
