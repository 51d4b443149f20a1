//! Mapping between [`Value`] and `serde_json::Value`.

use crate::value::{Key, Map, Number, Value};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as Json;

/// Prefix marking a JSON string as a raw PHP expression.
pub const PHP_SENTINEL: &str = "@php:";

pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(Number::Int(n)) => Json::Number((*n).into()),
        Value::Number(Number::Float(x)) => match serde_json::Number::from_f64(*x) {
            Some(n) => Json::Number(n),
            // INF and NAN have no JSON number; PHP spells them as constants
            None => Json::String(format!("{}{}", PHP_SENTINEL, non_finite_constant(*x))),
        },
        Value::String(s) => Json::String(encode_string(s)),
        Value::Const(raw) => Json::String(format!("{}{}", PHP_SENTINEL, raw)),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Map(map) => Json::Object(map_to_json(map)),
    }
}

fn non_finite_constant(x: f64) -> &'static str {
    if x.is_nan() {
        "NAN"
    } else if x > 0.0 {
        "INF"
    } else {
        "-INF"
    }
}

pub fn map_to_json(map: &Map) -> serde_json::Map<String, Json> {
    map.iter()
        .map(|(k, v)| (key_to_json(k), value_to_json(v)))
        .collect()
}

pub fn value_from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Number(number_from_json(n)),
        Json::String(s) => decode_string(s),
        Json::Array(items) => Value::List(items.iter().map(value_from_json).collect()),
        Json::Object(object) => Value::Map(
            object
                .iter()
                .map(|(k, v)| (key_from_json(k), value_from_json(v)))
                .collect(),
        ),
    }
}

fn number_from_json(n: &serde_json::Number) -> Number {
    if let Some(i) = n.as_i64() {
        Number::Int(i)
    } else {
        Number::Float(n.as_f64().unwrap_or_default())
    }
}

fn key_to_json(key: &Key) -> String {
    match key {
        Key::Int(n) => n.to_string(),
        Key::Str(s) => encode_string(s),
        Key::Const(raw) => format!("{}{}", PHP_SENTINEL, raw),
    }
}

fn key_from_json(text: &str) -> Key {
    match decode_string(text) {
        Value::Const(raw) => Key::Const(raw),
        Value::String(s) => Key::from_string(s),
        _ => Key::Str(text.to_string()),
    }
}

/// Strings that would read as a sentinel get one extra leading `@`.
fn encode_string(s: &str) -> String {
    if needs_escape(s) {
        format!("@{}", s)
    } else {
        s.to_string()
    }
}

fn decode_string(s: &str) -> Value {
    if let Some(raw) = s.strip_prefix(PHP_SENTINEL) {
        return Value::Const(raw.to_string());
    }
    if needs_escape(s) {
        return Value::String(s[1..].to_string());
    }
    Value::String(s.to_string())
}

/// Path (JSON pointer) of the first `@php:` string or key with no
/// expression after the prefix.
pub fn find_empty_expression(json: &Json) -> Option<String> {
    match json {
        Json::String(s) if is_empty_expression(s) => Some(String::new()),
        Json::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, item)| find_empty_expression(item).map(|path| format!("/{}{}", i, path))),
        Json::Object(object) => object.iter().find_map(|(k, v)| {
            if is_empty_expression(k) {
                return Some(format!("/{}", k));
            }
            find_empty_expression(v).map(|path| format!("/{}{}", k, path))
        }),
        _ => None,
    }
}

fn is_empty_expression(s: &str) -> bool {
    s.strip_prefix(PHP_SENTINEL)
        .is_some_and(|raw| raw.trim().is_empty())
}

fn needs_escape(s: &str) -> bool {
    s.starts_with('@') && s.trim_start_matches('@').starts_with("php:")
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        value_to_json(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        if let Some(path) = find_empty_expression(&json) {
            return Err(serde::de::Error::custom(format!(
                "empty PHP expression at '{}'",
                pointer_or_root(&path)
            )));
        }
        Ok(value_from_json(&json))
    }
}

pub(crate) fn pointer_or_root(path: &str) -> &str {
    if path.is_empty() { "/" } else { path }
}

/// `#[serde(with = "...")]` helper for [`Map`] fields.
pub(crate) mod map_serde {
    use super::*;

    pub fn serialize<S: Serializer>(map: &Map, serializer: S) -> Result<S::Ok, S::Error> {
        map_to_json(map).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Map, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Map(map) => Ok(map),
            Value::List(items) if items.is_empty() => Ok(Map::new()),
            other => Err(serde::de::Error::custom(format!(
                "expected an object, found {}",
                other.kind()
            ))),
        }
    }
}
