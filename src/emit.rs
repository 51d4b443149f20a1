//! PHP array-literal emission.
//!
//! Output re-parses with [`crate::literal`] to the same value: strings are
//! single-quoted unless they hold control characters, floats always carry a
//! fraction or exponent, and raw expressions are written back verbatim.

use crate::normalize::{FieldGroupDocument, Representation};
use crate::value::{Key, Number, Value};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// `array(...)` or `[...]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArrayStyle {
    #[default]
    Long,
    Short,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// One level of indentation.
    pub indent: String,
    pub array_style: ArrayStyle,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            array_style: ArrayStyle::Long,
        }
    }
}

impl EmitOptions {
    fn open(&self) -> &'static str {
        match self.array_style {
            ArrayStyle::Long => "array(",
            ArrayStyle::Short => "[",
        }
    }

    fn close(&self) -> &'static str {
        match self.array_style {
            ArrayStyle::Long => ")",
            ArrayStyle::Short => "]",
        }
    }
}

pub fn emit_value(value: &Value, opts: &EmitOptions) -> String {
    let mut out = String::new();
    write_value(&mut out, value, opts, 0);
    out
}

/// The group as it would appear in source, numeric settings that were
/// written quoted are quoted again.
pub fn emit_document(doc: &FieldGroupDocument, opts: &EmitOptions) -> String {
    emit_value(&doc.to_value(Representation::Source), opts)
}

/// `function_name( array(...) );` followed by a newline.
pub fn emit_registration_call(
    doc: &FieldGroupDocument,
    function_name: &str,
    opts: &EmitOptions,
) -> String {
    format!("{}( {} );\n", function_name, emit_document(doc, opts))
}

fn write_value(out: &mut String, value: &Value, opts: &EmitOptions, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(out, *n),
        Value::String(s) => write_string(out, s),
        Value::Const(raw) => out.push_str(raw),
        Value::List(items) => {
            write_array(out, items.iter().map(|v| (None, v)), items.is_empty(), opts, depth)
        }
        Value::Map(map) => write_array(
            out,
            map.iter().map(|(k, v)| (Some(k), v)),
            map.is_empty(),
            opts,
            depth,
        ),
    }
}

fn write_array<'a>(
    out: &mut String,
    entries: impl Iterator<Item = (Option<&'a Key>, &'a Value)>,
    empty: bool,
    opts: &EmitOptions,
    depth: usize,
) {
    out.push_str(opts.open());
    if empty {
        out.push_str(opts.close());
        return;
    }
    out.push('\n');
    for (key, value) in entries {
        push_indent(out, opts, depth + 1);
        if let Some(key) = key {
            write_key(out, key);
            out.push_str(" => ");
        }
        write_value(out, value, opts, depth + 1);
        out.push_str(",\n");
    }
    push_indent(out, opts, depth);
    out.push_str(opts.close());
}

fn push_indent(out: &mut String, opts: &EmitOptions, depth: usize) {
    for _ in 0..depth {
        out.push_str(&opts.indent);
    }
}

fn write_key(out: &mut String, key: &Key) {
    match key {
        Key::Int(n) => {
            let _ = write!(out, "{}", n);
        }
        Key::Str(s) => write_string(out, s),
        Key::Const(raw) => out.push_str(raw),
    }
}

fn write_number(out: &mut String, n: Number) {
    match n {
        Number::Float(x) if x.is_nan() => out.push_str("NAN"),
        Number::Float(x) if x.is_infinite() => {
            out.push_str(if x > 0.0 { "INF" } else { "-INF" })
        }
        _ => {
            let _ = write!(out, "{}", n);
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    if !s.chars().any(|c| c.is_ascii_control()) {
        out.push('\'');
        for c in s.chars() {
            if matches!(c, '\\' | '\'') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('\'');
        return;
    }

    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{0b}' => out.push_str("\\v"),
            '\u{1b}' => out.push_str("\\e"),
            '\u{0c}' => out.push_str("\\f"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
