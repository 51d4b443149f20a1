//! Normalized field group and field types.

use crate::convert::json::map_serde;
use crate::value::{Key, Map, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which surface a document is being rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// Numbers stay numbers.
    Json,
    /// Numbers that were written as quoted strings get their quotes back.
    Source,
}

/// Names of settings whose numeric value was written as a quoted string.
///
/// This only steers PHP emission; two documents that differ only here are
/// equal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuotedNumbers(BTreeSet<String>);

impl QuotedNumbers {
    pub fn insert(&mut self, name: impl Into<String>) {
        self.0.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for QuotedNumbers {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// One field group.
///
/// The serde form keeps every detail (quote hints included) and is what the
/// scan cache stores; the ACF JSON layout comes from [`to_value`](Self::to_value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGroupDocument {
    pub key: String,
    /// Usually a string; a translated title such as `__('Hero', 'theme')`
    /// is kept as a constant reference.
    pub title: Value,
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Remaining group settings in declaration order, `modified` last.
    #[serde(with = "map_serde", default)]
    pub settings: Map,
    #[serde(default, skip_serializing_if = "QuotedNumbers::is_empty")]
    pub quoted_numbers: QuotedNumbers,
}

/// One field, possibly holding sub fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub label: Value,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    /// Remaining settings in declaration order.
    #[serde(with = "map_serde", default)]
    pub settings: Map,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_fields: Vec<Field>,
    /// How many settings preceded `sub_fields` in the declaration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_fields_at: Option<usize>,
    #[serde(default, skip_serializing_if = "QuotedNumbers::is_empty")]
    pub quoted_numbers: QuotedNumbers,
}

impl FieldGroupDocument {
    /// Title as plain text; for a translated title, its first string argument.
    pub fn title_text(&self) -> String {
        display_text(&self.title)
    }

    pub fn setting(&self, name: &str) -> Option<&Value> {
        self.settings.get(&Key::Str(name.to_string()))
    }

    /// Number of fields including nested sub fields.
    pub fn field_count(&self) -> usize {
        self.fields.iter().map(Field::count).sum()
    }

    /// Render as a map with the canonical key order:
    /// `key, title, fields, ...settings`.
    pub fn to_value(&self, repr: Representation) -> Value {
        let mut map = Map::with_capacity(self.settings.len() + 3);
        map.insert(key("key"), Value::String(self.key.clone()));
        map.insert(key("title"), self.title.clone());
        map.insert(
            key("fields"),
            Value::List(self.fields.iter().map(|f| f.to_value(repr)).collect()),
        );
        extend_settings(&mut map, &self.settings, &self.quoted_numbers, repr);
        Value::Map(map)
    }
}

impl Field {
    pub fn label_text(&self) -> String {
        display_text(&self.label)
    }

    pub fn setting(&self, name: &str) -> Option<&Value> {
        self.settings.get(&Key::Str(name.to_string()))
    }

    fn count(&self) -> usize {
        1 + self.sub_fields.iter().map(Field::count).sum::<usize>()
    }

    /// Render as a map: `key, label, name, type, ...settings`, with
    /// `sub_fields` at its declared position.
    pub fn to_value(&self, repr: Representation) -> Value {
        let mut map = Map::with_capacity(self.settings.len() + 5);
        map.insert(key("key"), Value::String(self.key.clone()));
        map.insert(key("label"), self.label.clone());
        map.insert(key("name"), Value::String(self.name.clone()));
        map.insert(key("type"), Value::String(self.field_type.clone()));

        let sub_fields = || {
            Value::List(self.sub_fields.iter().map(|f| f.to_value(repr)).collect())
        };
        let at = match self.sub_fields_at {
            Some(at) => Some(at.min(self.settings.len())),
            None if !self.sub_fields.is_empty() => Some(self.settings.len()),
            None => None,
        };
        let (before, after) = match at {
            Some(at) => (at, self.settings.len()),
            None => (self.settings.len(), self.settings.len()),
        };

        let mut head = Map::new();
        let mut tail = Map::new();
        for (i, (k, v)) in self.settings.iter().enumerate() {
            if i < before {
                head.insert(k.clone(), v.clone());
            } else if i < after {
                tail.insert(k.clone(), v.clone());
            }
        }
        extend_settings(&mut map, &head, &self.quoted_numbers, repr);
        if at.is_some() {
            map.insert(key("sub_fields"), sub_fields());
        }
        extend_settings(&mut map, &tail, &self.quoted_numbers, repr);
        Value::Map(map)
    }
}

fn key(name: &str) -> Key {
    Key::Str(name.to_string())
}

fn extend_settings(target: &mut Map, settings: &Map, quoted: &QuotedNumbers, repr: Representation) {
    for (k, v) in settings {
        let value = match (repr, k, v) {
            (Representation::Source, Key::Str(name), Value::Number(n)) if quoted.contains(name) => {
                Value::String(n.to_string())
            }
            _ => v.clone(),
        };
        target.insert(k.clone(), value);
    }
}

pub(crate) fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Const(raw) => first_quoted(raw).unwrap_or_else(|| raw.clone()),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// First single- or double-quoted run inside raw source text.
fn first_quoted(raw: &str) -> Option<String> {
    let start = raw.find(&['\'', '"'][..])?;
    let quote = raw[start..].chars().next()?;
    let rest = &raw[start + 1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> Field {
        Field {
            key: format!("field_{}", name),
            label: Value::from(name),
            name: name.to_string(),
            field_type: "text".to_string(),
            settings: Map::new(),
            sub_fields: Vec::new(),
            sub_fields_at: None,
            quoted_numbers: QuotedNumbers::default(),
        }
    }

    #[test]
    fn test_title_text_from_translation_call() {
        let doc = FieldGroupDocument {
            key: "group_1".to_string(),
            title: Value::Const("__( 'Hero Banner', 'theme' )".to_string()),
            fields: vec![],
            settings: Map::new(),
            quoted_numbers: QuotedNumbers::default(),
        };
        assert_eq!(doc.title_text(), "Hero Banner");
    }

    #[test]
    fn test_field_order_with_sub_fields_position() {
        let mut repeater = field("items");
        repeater.field_type = "repeater".to_string();
        repeater.settings.insert(key("min"), 1.into());
        repeater.settings.insert(key("layout"), "table".into());
        repeater.sub_fields = vec![field("title")];
        repeater.sub_fields_at = Some(1);

        let value = repeater.to_value(Representation::Json);
        let keys: Vec<String> = value
            .as_map()
            .unwrap()
            .keys()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(
            keys,
            vec!["key", "label", "name", "type", "min", "sub_fields", "layout"]
        );
    }

    #[test]
    fn test_sub_fields_appended_when_position_unknown() {
        let mut group = field("group");
        group.settings.insert(key("layout"), "block".into());
        group.sub_fields = vec![field("inner")];

        let value = group.to_value(Representation::Json);
        let last = value.as_map().unwrap().keys().last().unwrap().to_string();
        assert_eq!(last, "sub_fields");
    }

    #[test]
    fn test_source_representation_requotes_numbers() {
        let mut f = field("count");
        f.settings.insert(key("min"), 1.into());
        f.settings.insert(key("max"), 5.into());
        f.quoted_numbers.insert("min");

        let source = f.to_value(Representation::Source);
        assert_eq!(source.get("min"), Some(&Value::from("1")));
        assert_eq!(source.get("max"), Some(&Value::from(5)));

        let json = f.to_value(Representation::Json);
        assert_eq!(json.get("min"), Some(&Value::from(1)));
    }

    #[test]
    fn test_quoted_numbers_ignored_by_equality() {
        let a = field("x");
        let mut b = field("x");
        b.quoted_numbers.insert("min");
        assert_eq!(a, b);
    }

    #[test]
    fn test_serde_form_keeps_quote_hints() {
        let mut f = field("count");
        f.settings.insert(key("min"), 1.into());
        f.quoted_numbers.insert("min");
        let text = serde_json::to_string(&f).unwrap();
        let back: Field = serde_json::from_str(&text).unwrap();
        assert!(back.quoted_numbers.contains("min"));
        assert_eq!(back, f);
    }

    #[test]
    fn test_field_count_includes_nested() {
        let mut parent = field("parent");
        parent.sub_fields = vec![field("a"), field("b")];
        let doc = FieldGroupDocument {
            key: "group_1".to_string(),
            title: "T".into(),
            fields: vec![parent, field("c")],
            settings: Map::new(),
            quoted_numbers: QuotedNumbers::default(),
        };
        assert_eq!(doc.field_count(), 4);
    }
}
