//! Field group normalization.
//!
//! Turns the raw [`Value`] of one registration-call argument into a
//! [`FieldGroupDocument`]:
//! - `key` and `title` are required; a missing key is synthesized and reported
//! - fields (and nested `sub_fields`) require `name` and `type`
//! - numeric-looking strings in numeric settings become numbers
//! - declaration order is kept everywhere; `modified` moves to the end

pub mod document;
pub mod error;
pub mod keys;

pub use document::{Field, FieldGroupDocument, QuotedNumbers, Representation};
pub use error::NormalizationError;

use crate::value::{Key, Map, Number, Value};
use std::fmt;
use tracing::{debug, trace};

/// Settings whose string values are coerced to numbers.
pub const DEFAULT_NUMERIC_SETTINGS: &[&str] = &[
    "min",
    "max",
    "step",
    "rows",
    "maxlength",
    "min_width",
    "max_width",
    "min_height",
    "max_height",
    "min_size",
    "max_size",
    "menu_order",
];

/// Something the normalizer had to fill in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeWarning {
    SynthesizedGroupKey { key: String },
    SynthesizedFieldKey { path: String, key: String },
}

impl fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SynthesizedGroupKey { key } => {
                write!(f, "field group has no 'key'; synthesized '{}'", key)
            }
            Self::SynthesizedFieldKey { path, key } => {
                write!(f, "{} has no 'key'; synthesized '{}'", path, key)
            }
        }
    }
}

/// A normalized document plus what had to be filled in along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub document: FieldGroupDocument,
    pub warnings: Vec<NormalizeWarning>,
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    numeric_settings: Vec<String>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            numeric_settings: DEFAULT_NUMERIC_SETTINGS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Coerce these settings too, on top of the defaults.
    pub fn with_numeric_settings<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in extra {
            let name = name.into();
            if !self.numeric_settings.contains(&name) {
                self.numeric_settings.push(name);
            }
        }
        self
    }

    pub fn numeric_settings(&self) -> &[String] {
        &self.numeric_settings
    }

    pub fn normalize(&self, value: &Value) -> Result<Normalized, NormalizationError> {
        let Value::Map(map) = value else {
            return Err(NormalizationError::NotAMap(value.kind()));
        };
        let mut warnings = Vec::new();

        let title = match map.get(&key("title")) {
            None => return Err(NormalizationError::missing("title")),
            Some(v @ (Value::String(_) | Value::Const(_))) => v.clone(),
            Some(other) => {
                return Err(NormalizationError::invalid_type("title", "a string", other.kind()));
            }
        };

        let group_key = match map.get(&key("key")) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            None | Some(Value::String(_)) | Some(Value::Null) => {
                let title_text = match &title {
                    Value::String(s) => s.clone(),
                    other => document::display_text(other),
                };
                let synthesized = keys::synthesize_group_key(&title_text, &content_of(value));
                debug!(key = %synthesized, "Synthesized field group key");
                warnings.push(NormalizeWarning::SynthesizedGroupKey {
                    key: synthesized.clone(),
                });
                synthesized
            }
            Some(other) => {
                return Err(NormalizationError::invalid_type("key", "a string", other.kind()));
            }
        };

        let fields = match map.get(&key("fields")) {
            None => Vec::new(),
            Some(v) => self.fields(v, "fields", &group_key, &mut warnings)?,
        };

        let mut settings = Map::new();
        let mut quoted = QuotedNumbers::default();
        for (k, v) in map {
            if matches!(k.as_str(), Some("key" | "title" | "fields")) {
                continue;
            }
            self.setting(k, v, &mut settings, &mut quoted);
        }
        if let Some(modified) = settings.shift_remove(&key("modified")) {
            settings.insert(key("modified"), modified);
        }

        trace!(key = %group_key, fields = fields.len(), "Normalized field group");
        Ok(Normalized {
            document: FieldGroupDocument {
                key: group_key,
                title,
                fields,
                settings,
                quoted_numbers: quoted,
            },
            warnings,
        })
    }

    fn fields(
        &self,
        value: &Value,
        path: &str,
        parent_key: &str,
        warnings: &mut Vec<NormalizeWarning>,
    ) -> Result<Vec<Field>, NormalizationError> {
        let items: Vec<&Value> = match value {
            Value::List(items) => items.iter().collect(),
            Value::Map(map) => map.values().collect(),
            other => return Err(NormalizationError::invalid_type(path, "a list", other.kind())),
        };
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                self.field(item, &format!("{}[{}]", path, i), parent_key, i, warnings)
            })
            .collect()
    }

    fn field(
        &self,
        value: &Value,
        path: &str,
        parent_key: &str,
        index: usize,
        warnings: &mut Vec<NormalizeWarning>,
    ) -> Result<Field, NormalizationError> {
        let Value::Map(map) = value else {
            return Err(NormalizationError::invalid_type(
                path,
                "an associative array",
                value.kind(),
            ));
        };

        let name = required_string(map, "name", path)?;
        let field_type = required_string(map, "type", path)?;

        let label = match map.get(&key("label")) {
            None | Some(Value::Null) => Value::String(String::new()),
            Some(v @ (Value::String(_) | Value::Const(_))) => v.clone(),
            Some(other) => {
                return Err(NormalizationError::invalid_type(
                    format!("{}.label", path),
                    "a string",
                    other.kind(),
                ));
            }
        };

        let field_key = match map.get(&key("key")) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            None | Some(Value::String(_)) | Some(Value::Null) => {
                let seed = if name.is_empty() {
                    document::display_text(&label)
                } else {
                    name.clone()
                };
                let synthesized = keys::synthesize_field_key(parent_key, index, &seed);
                debug!(path, key = %synthesized, "Synthesized field key");
                warnings.push(NormalizeWarning::SynthesizedFieldKey {
                    path: path.to_string(),
                    key: synthesized.clone(),
                });
                synthesized
            }
            Some(other) => {
                return Err(NormalizationError::invalid_type(
                    format!("{}.key", path),
                    "a string",
                    other.kind(),
                ));
            }
        };

        let mut settings = Map::new();
        let mut quoted = QuotedNumbers::default();
        let mut sub_fields = Vec::new();
        let mut sub_fields_at = None;
        for (k, v) in map {
            match k.as_str() {
                Some("key" | "label" | "name" | "type") => {}
                Some("sub_fields") => {
                    sub_fields_at = Some(settings.len());
                    sub_fields =
                        self.fields(v, &format!("{}.sub_fields", path), &field_key, warnings)?;
                }
                _ => self.setting(k, v, &mut settings, &mut quoted),
            }
        }

        Ok(Field {
            key: field_key,
            label,
            name,
            field_type,
            settings,
            sub_fields,
            sub_fields_at,
            quoted_numbers: quoted,
        })
    }

    fn setting(&self, k: &Key, v: &Value, settings: &mut Map, quoted: &mut QuotedNumbers) {
        if let (Key::Str(name), Value::String(s)) = (k, v)
            && self.numeric_settings.iter().any(|n| n == name)
            && let Some(number) = Number::parse_numeric(s)
        {
            quoted.insert(name.as_str());
            settings.insert(k.clone(), Value::Number(number));
            return;
        }
        settings.insert(k.clone(), v.clone());
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize with the default settings.
pub fn normalize_group(value: &Value) -> Result<Normalized, NormalizationError> {
    Normalizer::new().normalize(value)
}

fn key(name: &str) -> Key {
    Key::Str(name.to_string())
}

fn required_string(map: &Map, name: &str, path: &str) -> Result<String, NormalizationError> {
    match map.get(&key(name)) {
        Some(Value::String(s)) => Ok(s.clone()),
        None => Err(NormalizationError::missing(format!("{}.{}", path, name))),
        Some(other) => Err(NormalizationError::invalid_type(
            format!("{}.{}", path, name),
            "a string",
            other.kind(),
        )),
    }
}

/// Stable text of a raw group used to seed synthesized keys.
fn content_of(value: &Value) -> String {
    serde_json::to_string(&crate::convert::value_to_json(value)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::parse_str;

    fn normalize_php(src: &str) -> Normalized {
        normalize_group(&parse_str(src).unwrap()).unwrap()
    }

    #[test]
    fn test_normalize_basic_group() {
        let normalized = normalize_php(
            "array(
                'key' => 'group_1',
                'title' => 'Hero',
                'fields' => array(
                    array('key' => 'field_1', 'label' => 'Heading', 'name' => 'heading', 'type' => 'text'),
                ),
                'position' => 'normal',
            )",
        );
        assert!(normalized.warnings.is_empty());
        let doc = normalized.document;
        assert_eq!(doc.key, "group_1");
        assert_eq!(doc.title, Value::from("Hero"));
        assert_eq!(doc.fields.len(), 1);
        assert_eq!(doc.fields[0].field_type, "text");
        assert_eq!(doc.setting("position"), Some(&Value::from("normal")));
    }

    #[test]
    fn test_missing_group_key_is_synthesized() {
        let normalized = normalize_php("array('title' => 'Contact Info', 'fields' => array())");
        let key = &normalized.document.key;
        assert!(key.starts_with("group_contact_info_"), "{}", key);
        let hash = key.trim_start_matches("group_contact_info_");
        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(
            normalized.warnings,
            vec![NormalizeWarning::SynthesizedGroupKey { key: key.clone() }]
        );
        assert!(normalized.warnings[0].to_string().contains("no 'key'"));
    }

    #[test]
    fn test_synthesized_key_is_deterministic() {
        let src = "array('title' => 'Contact Info')";
        assert_eq!(normalize_php(src).document.key, normalize_php(src).document.key);
    }

    #[test]
    fn test_missing_title_is_error() {
        let err = normalize_group(&parse_str("array('key' => 'group_1')").unwrap()).unwrap_err();
        assert_eq!(err, NormalizationError::MissingKey("title".to_string()));
    }

    #[test]
    fn test_not_a_map_is_error() {
        let err = normalize_group(&parse_str("array('a', 'b')").unwrap()).unwrap_err();
        assert_eq!(err, NormalizationError::NotAMap("list"));
    }

    #[test]
    fn test_field_requires_name_and_type() {
        let err = normalize_group(
            &parse_str("array('key' => 'g', 'title' => 't', 'fields' => array(array('name' => 'x')))")
                .unwrap(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            NormalizationError::MissingKey("fields[0].type".to_string())
        );
    }

    #[test]
    fn test_missing_field_key_synthesized_with_warning() {
        let normalized = normalize_php(
            "array('key' => 'group_1', 'title' => 't', 'fields' => array(
                array('name' => 'email', 'type' => 'email'),
            ))",
        );
        let field = &normalized.document.fields[0];
        assert!(field.key.starts_with("field_email_"));
        assert_eq!(field.label, Value::from(""));
        assert!(matches!(
            &normalized.warnings[0],
            NormalizeWarning::SynthesizedFieldKey { path, .. } if path == "fields[0]"
        ));
    }

    #[test]
    fn test_numeric_coercion_records_quoted() {
        let normalized = normalize_php(
            "array('key' => 'g', 'title' => 't', 'menu_order' => '3', 'fields' => array(
                array('key' => 'f', 'name' => 'n', 'type' => 'number', 'min' => '1', 'max' => 10, 'placeholder' => '5'),
            ))",
        );
        let doc = &normalized.document;
        assert_eq!(doc.setting("menu_order"), Some(&Value::from(3)));
        assert!(doc.quoted_numbers.contains("menu_order"));

        let field = &doc.fields[0];
        assert_eq!(field.setting("min"), Some(&Value::from(1)));
        assert!(field.quoted_numbers.contains("min"));
        assert_eq!(field.setting("max"), Some(&Value::from(10)));
        assert!(!field.quoted_numbers.contains("max"));
        // not a numeric setting
        assert_eq!(field.setting("placeholder"), Some(&Value::from("5")));
    }

    #[test]
    fn test_extra_numeric_settings() {
        let value = parse_str(
            "array('key' => 'g', 'title' => 't', 'fields' => array(
                array('key' => 'f', 'name' => 'n', 'type' => 'range', 'default_value' => '50'),
            ))",
        )
        .unwrap();
        let doc = Normalizer::new()
            .with_numeric_settings(["default_value"])
            .normalize(&value)
            .unwrap()
            .document;
        assert_eq!(doc.fields[0].setting("default_value"), Some(&Value::from(50)));
    }

    #[test]
    fn test_sub_fields_normalized_recursively() {
        let normalized = normalize_php(
            "array('key' => 'g', 'title' => 't', 'fields' => array(
                array('key' => 'f_rep', 'name' => 'items', 'type' => 'repeater', 'min' => 0,
                    'sub_fields' => array(
                        array('name' => 'item', 'type' => 'text'),
                    ),
                    'layout' => 'table'),
            ))",
        );
        let repeater = &normalized.document.fields[0];
        assert_eq!(repeater.sub_fields.len(), 1);
        assert_eq!(repeater.sub_fields_at, Some(1));
        assert!(repeater.sub_fields[0].key.starts_with("field_item_"));
        assert!(matches!(
            &normalized.warnings[0],
            NormalizeWarning::SynthesizedFieldKey { path, .. } if path == "fields[0].sub_fields[0]"
        ));
    }

    #[test]
    fn test_modified_moves_last() {
        let doc = normalize_php(
            "array('key' => 'g', 'modified' => 1700000000, 'title' => 't', 'active' => true)",
        )
        .document;
        let keys: Vec<String> = doc.settings.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["active", "modified"]);
    }

    #[test]
    fn test_translated_title_kept_as_constant() {
        let normalized = normalize_php("array('title' => __('Contact Info', 'theme'))");
        assert_eq!(
            normalized.document.title,
            Value::Const("__('Contact Info', 'theme')".to_string())
        );
        assert!(normalized.document.key.starts_with("group_contact_info_"));
    }

    #[test]
    fn test_constant_key_is_error() {
        let err = normalize_group(&parse_str("array('key' => GROUP_KEY, 'title' => 't')").unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            NormalizationError::invalid_type("key", "a string", "constant")
        );
    }
}
