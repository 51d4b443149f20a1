//! Conversion between field group documents and ACF local JSON.
//!
//! JSON has no way to tell a PHP expression from a string, so raw
//! expressions ([`Value::Const`]) are written as strings carrying the
//! `@php:` prefix: `__('Hero', 'theme')` becomes `"@php:__('Hero', 'theme')"`.
//! A real string that already starts with one or more `@` followed by `php:`
//! is written with one extra leading `@`, and reading strips it again, so the
//! mapping is reversible in both directions.
//!
//! Documents are laid out as `key, title, fields, ...settings` with
//! `modified` last; fields as `key, label, name, type, ...settings` with
//! `sub_fields` where it was declared.
//!
//! [`Value::Const`]: crate::value::Value::Const

pub mod json;

pub use json::{PHP_SENTINEL, value_from_json, value_to_json};

use json::{find_empty_expression, pointer_or_root};

use crate::emit::{EmitOptions, emit_document};
use crate::normalize::{FieldGroupDocument, Normalizer, Representation};
use serde_json::Value as Json;
use std::fmt;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionErrorKind {
    /// The text is not valid JSON.
    Syntax,
    /// Valid JSON that does not describe a field group.
    Structure,
}

impl fmt::Display for ConversionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => f.write_str("syntax error"),
            Self::Structure => f.write_str("structure error"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}{}: {message}", .offset.map(|o| format!(" at offset {}", o)).unwrap_or_default())]
pub struct ConversionError {
    pub kind: ConversionErrorKind,
    /// Byte offset into the input, for syntax errors.
    pub offset: Option<usize>,
    pub message: String,
}

impl ConversionError {
    pub fn structure(message: impl Into<String>) -> Self {
        Self {
            kind: ConversionErrorKind::Structure,
            offset: None,
            message: message.into(),
        }
    }

    fn syntax(text: &str, err: &serde_json::Error) -> Self {
        Self {
            kind: ConversionErrorKind::Syntax,
            offset: Some(byte_offset(text, err.line(), err.column())),
            message: err.to_string(),
        }
    }
}

/// Pretty JSON (two-space indent, trailing newline).
pub fn document_to_json(doc: &FieldGroupDocument) -> String {
    let json = value_to_json(&doc.to_value(Representation::Json));
    let mut text = serde_json::to_string_pretty(&json).unwrap_or_default();
    text.push('\n');
    text
}

/// Several groups as one JSON array, the shape of an ACF export file.
pub fn documents_to_json(docs: &[FieldGroupDocument]) -> String {
    let json = Json::Array(
        docs.iter()
            .map(|doc| value_to_json(&doc.to_value(Representation::Json)))
            .collect(),
    );
    let mut text = serde_json::to_string_pretty(&json).unwrap_or_default();
    text.push('\n');
    text
}

pub fn document_from_json(text: &str) -> Result<FieldGroupDocument, ConversionError> {
    document_from_json_with(&Normalizer::new(), text)
}

/// Like [`document_from_json`], with the caller's numeric settings.
pub fn document_from_json_with(
    normalizer: &Normalizer,
    text: &str,
) -> Result<FieldGroupDocument, ConversionError> {
    let json = parse_json(text)?;
    document_from_value(normalizer, &json)
}

/// Accepts a single group object or an array of groups (ACF export file).
pub fn documents_from_json(text: &str) -> Result<Vec<FieldGroupDocument>, ConversionError> {
    documents_from_json_with(&Normalizer::new(), text)
}

pub fn documents_from_json_with(
    normalizer: &Normalizer,
    text: &str,
) -> Result<Vec<FieldGroupDocument>, ConversionError> {
    match parse_json(text)? {
        Json::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                document_from_value(normalizer, item).map_err(|e| {
                    ConversionError::structure(format!("group [{}]: {}", i, e.message))
                })
            })
            .collect(),
        json => document_from_value(normalizer, &json).map(|doc| vec![doc]),
    }
}

/// JSON text of one group to a PHP array literal.
pub fn json_to_php(text: &str, opts: &EmitOptions) -> Result<String, ConversionError> {
    json_to_php_with(&Normalizer::new(), text, opts)
}

pub fn json_to_php_with(
    normalizer: &Normalizer,
    text: &str,
    opts: &EmitOptions,
) -> Result<String, ConversionError> {
    document_from_json_with(normalizer, text).map(|doc| emit_document(&doc, opts))
}

/// Convert several JSON texts; each one succeeds or fails on its own.
pub fn convert_batch<'a, I>(inputs: I, opts: &EmitOptions) -> Vec<Result<String, ConversionError>>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalizer = Normalizer::new();
    inputs
        .into_iter()
        .map(|text| json_to_php_with(&normalizer, text, opts))
        .collect()
}

fn parse_json(text: &str) -> Result<Json, ConversionError> {
    serde_json::from_str(text).map_err(|e| ConversionError::syntax(text, &e))
}

fn document_from_value(normalizer: &Normalizer, json: &Json) -> Result<FieldGroupDocument, ConversionError> {
    if !json.is_object() {
        return Err(ConversionError::structure(format!(
            "expected a field group object, found {}",
            json_kind(json)
        )));
    }
    if let Some(path) = find_empty_expression(json) {
        return Err(ConversionError::structure(format!(
            "empty PHP expression at '{}'",
            pointer_or_root(&path)
        )));
    }
    let normalized = normalizer
        .normalize(&value_from_json(json))
        .map_err(|e| ConversionError::structure(e.to_string()))?;
    for warning in &normalized.warnings {
        warn!(key = %normalized.document.key, "{}", warning);
    }
    Ok(normalized.document)
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// serde_json reports 1-based line and column; column 0 means the error sits
/// on the line break itself.
fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (i, l) in text.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            return (offset + column.saturating_sub(1)).min(text.len());
        }
        offset += l.len();
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::parse_str;
    use crate::normalize::normalize_group;
    use crate::value::Value;

    const GROUP: &str = r#"{
  "key": "group_1",
  "title": "Hero",
  "fields": [
    {
      "key": "field_1",
      "label": "Heading",
      "name": "heading",
      "type": "text",
      "maxlength": 80
    }
  ],
  "position": "normal",
  "modified": 1700000000
}
"#;

    #[test]
    fn test_json_round_trip_is_byte_identical() {
        let doc = document_from_json(GROUP).unwrap();
        assert_eq!(document_to_json(&doc), GROUP);
    }

    #[test]
    fn test_modified_written_last() {
        let doc = normalize_group(
            &parse_str("array('key' => 'g', 'modified' => 5, 'title' => 't', 'active' => true)")
                .unwrap(),
        )
        .unwrap()
        .document;
        let text = document_to_json(&doc);
        let active = text.find("\"active\"").unwrap();
        let modified = text.find("\"modified\"").unwrap();
        assert!(active < modified);
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_syntax_error_offset() {
        let err = document_from_json("{\n  \"key\": \"group_1\",\n  \"title\" \"x\"\n}").unwrap_err();
        assert_eq!(err.kind, ConversionErrorKind::Syntax);
        // the second string on line 3
        assert_eq!(err.offset, Some(32));
        assert!(err.to_string().starts_with("syntax error at offset 32"));
    }

    #[test]
    fn test_truncated_input_is_syntax_error() {
        let err = document_from_json("{\"key\": ").unwrap_err();
        assert_eq!(err.kind, ConversionErrorKind::Syntax);
        assert!(err.offset.unwrap() <= 8);
    }

    #[test]
    fn test_structure_errors() {
        let err = document_from_json("[1, 2]").unwrap_err();
        assert_eq!(err.kind, ConversionErrorKind::Structure);
        assert_eq!(err.offset, None);

        let err = document_from_json(r#"{"key": "group_1"}"#).unwrap_err();
        assert_eq!(err.kind, ConversionErrorKind::Structure);
        assert!(err.message.contains("title"));
    }

    #[test]
    fn test_documents_from_json_array() {
        let text = r#"[{"key": "group_a", "title": "A"}, {"key": "group_b", "title": "B"}]"#;
        let docs = documents_from_json(text).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].key, "group_b");

        let err = documents_from_json(r#"[{"key": "group_a", "title": "A"}, 3]"#).unwrap_err();
        assert!(err.message.starts_with("group [1]"));
    }

    #[test]
    fn test_documents_to_json_reads_back() {
        let text = r#"[{"key": "group_a", "title": "A"}, {"key": "group_b", "title": "B"}]"#;
        let docs = documents_from_json(text).unwrap();
        let written = documents_to_json(&docs);
        assert!(written.starts_with('['));
        assert_eq!(documents_from_json(&written).unwrap(), docs);
    }

    #[test]
    fn test_translated_title_round_trip() {
        let doc = document_from_json(r#"{"key": "g", "title": "@php:__('Hero', 'theme')"}"#)
            .unwrap();
        assert_eq!(doc.title, Value::Const("__('Hero', 'theme')".to_string()));
        assert!(document_to_json(&doc).contains(r#""title": "@php:__('Hero', 'theme')""#));
    }

    #[test]
    fn test_convert_batch_reports_each_item() {
        let results = convert_batch(
            [
                r#"{"key": "group_1", "title": "One"}"#,
                "{not json",
                r#"{"key": "group_3", "title": "Three"}"#,
            ],
            &EmitOptions::default(),
        );
        assert_eq!(results.len(), 3);
        assert!(results[0].as_ref().unwrap().contains("'group_1'"));
        assert_eq!(results[1].as_ref().unwrap_err().kind, ConversionErrorKind::Syntax);
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_empty_expression_is_structure_error() {
        let err = json_to_php(r#"{"key":"group_1","title":"T","style":"@php:"}"#, &EmitOptions::default())
            .unwrap_err();
        assert_eq!(err.kind, ConversionErrorKind::Structure);
        assert!(err.message.contains("'/style'"));

        let err = document_from_json(
            r#"{"key":"g","title":"T","fields":[{"key":"f","name":"n","type":"text","default_value":"@php:  "}]}"#,
        )
        .unwrap_err();
        assert!(err.message.contains("'/fields/0/default_value'"));

        // an escaped literal string is fine
        let php = json_to_php(r#"{"key":"g","title":"T","style":"@@php:"}"#, &EmitOptions::default()).unwrap();
        assert!(php.contains("'style' => '@php:',"));
    }

    #[test]
    fn test_overflowing_number_survives_json() {
        let literal = "array('key' => 'g', 'title' => 'T', 'ratio' => 1e999)";
        let doc = normalize_group(&parse_str(literal).unwrap()).unwrap().document;
        let json = document_to_json(&doc);
        assert!(json.contains(r#""ratio": "@php:1e999""#));
        assert_eq!(document_from_json(&json).unwrap(), doc);
        assert!(emit_document(&doc, &EmitOptions::default()).contains("'ratio' => 1e999,"));
    }

    #[test]
    fn test_json_honours_numeric_settings() {
        let text = r#"{"key":"g","title":"T","fields":[{"key":"f","name":"n","type":"range","default_value":"50"}]}"#;
        let normalizer = Normalizer::new().with_numeric_settings(["default_value"]);

        let plain = document_from_json(text).unwrap();
        assert_eq!(plain.fields[0].setting("default_value"), Some(&Value::from("50")));

        let tuned = document_from_json_with(&normalizer, text).unwrap();
        assert_eq!(tuned.fields[0].setting("default_value"), Some(&Value::from(50)));
        let docs = documents_from_json_with(&normalizer, &format!("[{}]", text)).unwrap();
        assert_eq!(docs[0], tuned);

        // quoted in the input, so quoted again in PHP
        let php = json_to_php_with(&normalizer, text, &EmitOptions::default()).unwrap();
        assert!(php.contains("'default_value' => '50',"));
    }

    #[test]
    fn test_byte_offset() {
        assert_eq!(byte_offset("abc\ndef", 2, 2), 5);
        assert_eq!(byte_offset("abc", 1, 1), 0);
        assert_eq!(byte_offset("abc", 5, 1), 3);
    }
}
