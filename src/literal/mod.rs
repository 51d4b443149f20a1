//! PHP array-literal parsing.
//!
//! This module reads the subset of PHP expression syntax used to describe
//! field groups:
//! - `array(...)` and `[...]` literals with positional and `key => value` entries
//! - single- and double-quoted strings with escapes
//! - integer and float literals, `true`/`false`/`null`
//! - constants and any other expression, kept verbatim as [`Value::Const`]
//!
//! Nothing is evaluated. Comments and whitespace between tokens are skipped.
//!
//! [`Value::Const`]: crate::value::Value::Const

pub mod cursor;
pub mod error;
pub mod parser;

pub use cursor::Cursor;
pub use error::{ParseError, ParseErrorKind};
pub use parser::{MAX_DEPTH, Parsed, parse_literal, parse_str};
