//! In-memory value tree for parsed PHP array literals.
//!
//! A [`Value`] is what the literal parser produces and what the normalizer,
//! the JSON converter and the source emitter consume. Maps keep insertion
//! order; nothing in the crate ever re-sorts them.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::fmt;

/// Ordered associative array.
pub type Map = IndexMap<Key, Value>;

/// A PHP value that can be described by a literal without running code.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Map(Map),
    List(Vec<Value>),
    /// Opaque reference or expression kept as raw source text
    /// (`MY_CONSTANT`, `__('Label', 'theme')`, `$var`).
    Const(String),
}

/// Numeric literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

/// Array key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
    /// Key given by an expression, kept as raw source text.
    Const(String),
}

impl Key {
    /// Build a key from a string with PHP's integer-key coercion:
    /// `"5"` and `"-3"` become integer keys, `"05"` and `"5.0"` stay strings.
    pub fn from_string(s: impl Into<String>) -> Self {
        let s = s.into();
        match canonical_int(&s) {
            Some(n) => Key::Int(n),
            None => Key::Str(s),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{}", n),
            Key::Str(s) | Key::Const(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::from_string(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::from_string(s)
    }
}

fn canonical_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if s == "-0" {
        return None;
    }
    s.parse().ok()
}

impl Number {
    /// Parse a numeric-looking string (`"10"`, `"-2.5"`, `" 3 "` is rejected).
    pub fn parse_numeric(s: &str) -> Option<Number> {
        if s.is_empty() || s.trim() != s {
            return None;
        }
        if let Ok(n) = s.parse::<i64>() {
            return Some(Number::Int(n));
        }
        let looks_float = s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
            && s.bytes().any(|b| b.is_ascii_digit());
        if looks_float {
            return s
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Number::Float);
        }
        None
    }
}

impl fmt::Display for Number {
    /// Floats always keep a fraction or exponent so they read back as floats.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Float(x) => write!(f, "{:?}", x),
        }
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a string key in a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()
            .and_then(|m| m.get(&Key::Str(key.to_string())))
    }

    /// Human readable kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(Number::Int(_)) => "int",
            Value::Number(Number::Float(_)) => "float",
            Value::String(_) => "string",
            Value::Map(_) => "map",
            Value::List(_) => "list",
            Value::Const(_) => "constant",
        }
    }

    /// Build a map or a list from literal entries.
    ///
    /// Entries without a key are positional and are numbered from zero over
    /// the positional entries only. If every entry is positional the result
    /// is a list. A positional number that lands on a key already present, or
    /// an explicit key that lands on a positional number, is a collision.
    pub fn from_entries(entries: Vec<(Option<Key>, Value)>) -> Result<Value, KeyCollision> {
        if entries.iter().all(|(k, _)| k.is_none()) {
            return Ok(Value::List(entries.into_iter().map(|(_, v)| v).collect()));
        }
        let mut map = Map::with_capacity(entries.len());
        let mut positional: FxHashSet<i64> = FxHashSet::default();
        let mut position = 0i64;
        for (index, (key, value)) in entries.into_iter().enumerate() {
            let key = match key {
                Some(k) => {
                    if let Key::Int(n) = k
                        && positional.contains(&n)
                    {
                        return Err(KeyCollision { index, key: k });
                    }
                    k
                }
                None => {
                    let k = Key::Int(position);
                    if map.contains_key(&k) {
                        return Err(KeyCollision { index, key: k });
                    }
                    positional.insert(position);
                    position += 1;
                    k
                }
            };
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}

/// Two entries of one literal resolved to the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
    /// Position of the later entry in the literal.
    pub index: usize,
    pub key: Key,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::Int(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
