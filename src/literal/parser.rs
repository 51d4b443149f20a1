//! Recursive-descent parser for PHP array literals.

use super::cursor::{Cursor, is_ident_byte, is_ident_start};
use super::error::{ParseError, ParseErrorKind};
use crate::value::{Key, Number, Value};
use tracing::trace;

/// Deepest nesting accepted before giving up.
pub const MAX_DEPTH: usize = 256;

/// Keywords that start an expression we never try to read structurally.
const EXPRESSION_KEYWORDS: &[&str] = &[
    "new", "clone", "function", "fn", "static", "match", "print", "include", "require",
    "include_once", "require_once", "isset", "empty",
];

/// A parsed literal and the offset just past its closing delimiter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub value: Value,
    pub end: usize,
}

/// Parse the array literal starting at `start` in `source`.
///
/// `start` must point at `[` or at the `array` keyword. Offsets in the
/// result and in errors are absolute offsets into `source`.
pub fn parse_literal(source: &str, start: usize) -> Result<Parsed, ParseError> {
    let mut parser = Parser::new(source, start);
    let value = parser.parse_array()?;
    trace!(start, end = parser.cursor.pos(), "Parsed array literal");
    Ok(Parsed {
        value,
        end: parser.cursor.pos(),
    })
}

/// Parse text that consists of exactly one array literal, optionally
/// surrounded by whitespace and comments.
pub fn parse_str(text: &str) -> Result<Value, ParseError> {
    let mut cursor = Cursor::new(text, 0);
    cursor.skip_trivia()?;
    let parsed = parse_literal(text, cursor.pos())?;
    let mut cursor = Cursor::new(text, parsed.end);
    cursor.skip_trivia()?;
    if !cursor.at_end() {
        return Err(cursor.error(ParseErrorKind::TrailingInput));
    }
    Ok(parsed.value)
}

/// Whether `array` at the cursor opens an `array(...)` literal.
pub(crate) fn at_long_array(cursor: &Cursor<'_>) -> bool {
    if !cursor.starts_with_ignore_case("array") || cursor.peek_at(5).is_some_and(is_ident_byte) {
        return false;
    }
    let mut probe = cursor.clone();
    probe.advance(5);
    probe.skip_trivia().is_ok() && probe.peek() == Some(b'(')
}

struct Parser<'a> {
    cursor: Cursor<'a>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, start: usize) -> Self {
        Self {
            cursor: Cursor::new(source, start),
            depth: 0,
        }
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        let close = match self.cursor.peek() {
            Some(b'[') => {
                self.cursor.bump();
                b']'
            }
            Some(_) if at_long_array(&self.cursor) => {
                self.cursor.advance(5);
                self.cursor.skip_trivia()?;
                self.cursor.bump();
                b')'
            }
            _ => return Err(self.cursor.error(ParseErrorKind::ExpectedArray)),
        };

        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.cursor.error(ParseErrorKind::TooDeep(MAX_DEPTH)));
        }

        let mut entries: Vec<(Option<Key>, Value)> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();
        loop {
            self.cursor.skip_trivia()?;
            match self.cursor.peek() {
                None => return Err(self.cursor.error(ParseErrorKind::UnexpectedEnd)),
                Some(b) if b == close => {
                    self.cursor.bump();
                    break;
                }
                Some(_) => {}
            }

            let first_at = self.cursor.pos();
            offsets.push(first_at);
            let first = self.parse_value(close)?;
            self.cursor.skip_trivia()?;
            if self.cursor.starts_with("=>") {
                self.cursor.advance(2);
                let key = to_key(first, first_at)?;
                self.cursor.skip_trivia()?;
                let value = self.parse_value(close)?;
                entries.push((Some(key), value));
            } else {
                entries.push((None, first));
            }

            self.cursor.skip_trivia()?;
            match self.cursor.peek() {
                None => return Err(self.cursor.error(ParseErrorKind::UnexpectedEnd)),
                Some(b',') => self.cursor.bump(),
                Some(b) if b == close => {
                    self.cursor.bump();
                    break;
                }
                Some(_) => {
                    let found = self.cursor.peek_char();
                    return Err(self.cursor.error(ParseErrorKind::ExpectedSeparator(found)));
                }
            }
        }

        self.depth -= 1;
        Value::from_entries(entries).map_err(|collision| {
            ParseError::new(
                offsets[collision.index],
                ParseErrorKind::KeyCollision(collision.key.to_string()),
            )
        })
    }

    fn parse_value(&mut self, close: u8) -> Result<Value, ParseError> {
        let start = self.cursor.pos();
        let Some(b) = self.cursor.peek() else {
            return Err(self.cursor.error(ParseErrorKind::UnexpectedEnd));
        };

        let value = match b {
            b'[' => self.parse_array()?,
            b'\'' => Value::String(self.parse_single_quoted()?),
            b'"' => match self.parse_double_quoted()? {
                Some(s) => Value::String(s),
                None => Value::Const(self.cursor.src()[start..self.cursor.pos()].to_string()),
            },
            b'0'..=b'9' => self.parse_number()?,
            b'.' if self.cursor.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => {
                self.parse_number()?
            }
            b'-' | b'+' if self.starts_number_after_sign() => self.parse_number()?,
            b'\\' => return self.parse_identifier(start, close),
            _ if is_ident_start(b) => {
                if at_long_array(&self.cursor) {
                    self.parse_array()?
                } else {
                    return self.parse_identifier(start, close);
                }
            }
            b',' => return Err(self.cursor.error(ParseErrorKind::ExpectedValue)),
            _ if b == close => return Err(self.cursor.error(ParseErrorKind::ExpectedValue)),
            b'$' | b'(' | b'!' | b'-' | b'+' | b'@' | b'~' | b'`' | b'&' => {
                return self.capture_expression(start, close);
            }
            b'<' if self.cursor.starts_with("<<<") => return self.capture_expression(start, close),
            _ => {
                let found = self.cursor.peek_char();
                return Err(self.cursor.error(ParseErrorKind::UnexpectedChar(found)));
            }
        };

        self.finish_value(start, close, value)
    }

    /// A complete value must be followed by a separator or a closing
    /// delimiter; an operator turns the whole thing into an expression.
    fn finish_value(&mut self, start: usize, close: u8, value: Value) -> Result<Value, ParseError> {
        let resume = self.cursor.pos();
        self.cursor.skip_trivia()?;
        match self.cursor.peek() {
            None | Some(b',') => {}
            Some(b) if b == close => {}
            Some(b'=') if self.cursor.starts_with("=>") => {}
            Some(b) if is_operator(b) => return self.capture_expression(start, close),
            Some(_) => {
                let found = self.cursor.peek_char();
                return Err(self.cursor.error(ParseErrorKind::ExpectedSeparator(found)));
            }
        }
        self.cursor.set_pos(resume);
        Ok(value)
    }

    /// Keep everything from `start` up to the next top-level `,`, `=>` or
    /// closing delimiter as raw source.
    fn capture_expression(&mut self, start: usize, close: u8) -> Result<Value, ParseError> {
        self.cursor.set_pos(start);
        let end = self.cursor.skip_expression(|c| match c.peek() {
            Some(b',') => true,
            Some(b) if b == close => true,
            Some(b'=') => c.starts_with("=>"),
            _ => false,
        })?;
        if end == start {
            return Err(ParseError::new(start, ParseErrorKind::ExpectedValue));
        }
        let raw = &self.cursor.src()[start..end];
        trace!(offset = start, raw, "Kept expression as constant reference");
        Ok(Value::Const(raw.to_string()))
    }

    fn parse_identifier(&mut self, start: usize, close: u8) -> Result<Value, ParseError> {
        let src = self.cursor.src();
        loop {
            if self.cursor.peek() == Some(b'\\') {
                self.cursor.bump();
            }
            let len = self.cursor.ident_len();
            if len == 0 {
                return Err(self
                    .cursor
                    .error(ParseErrorKind::UnexpectedChar(self.cursor.peek_char())));
            }
            self.cursor.advance(len);
            let continues = match self.cursor.peek() {
                Some(b'\\') => true,
                Some(b':') => {
                    self.cursor.starts_with("::")
                        && self
                            .cursor
                            .peek_at(2)
                            .is_some_and(|b| is_ident_start(b) || b == b'$')
                }
                _ => false,
            };
            if !continues {
                break;
            }
            if self.cursor.peek() == Some(b':') {
                self.cursor.advance(2);
                if self.cursor.peek() == Some(b'$') {
                    // static property access
                    return self.capture_expression(start, close);
                }
            }
        }

        let name = &src[start..self.cursor.pos()];
        let lower = name.to_ascii_lowercase();
        if EXPRESSION_KEYWORDS.contains(&lower.as_str()) {
            return self.capture_expression(start, close);
        }
        let value = match lower.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => Value::Const(name.to_string()),
        };
        self.finish_value(start, close, value)
    }

    fn parse_single_quoted(&mut self) -> Result<String, ParseError> {
        let src = self.cursor.src();
        let start = self.cursor.pos();
        self.cursor.bump();
        let mut out = String::new();
        let mut segment = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                None => return Err(ParseError::new(start, ParseErrorKind::UnterminatedString)),
                Some(b'\\') if matches!(self.cursor.peek_at(1), Some(b'\'') | Some(b'\\')) => {
                    out.push_str(&src[segment..self.cursor.pos()]);
                    self.cursor.bump();
                    segment = self.cursor.pos();
                    self.cursor.bump();
                }
                Some(b'\'') => {
                    out.push_str(&src[segment..self.cursor.pos()]);
                    self.cursor.bump();
                    return Ok(out);
                }
                Some(_) => self.cursor.bump(),
            }
        }
    }

    /// Returns `None` when the string interpolates variables or its byte
    /// escapes do not decode as UTF-8; either way the caller keeps it raw.
    fn parse_double_quoted(&mut self) -> Result<Option<String>, ParseError> {
        let src = self.cursor.src();
        let start = self.cursor.pos();
        self.cursor.bump();
        let mut out: Vec<u8> = Vec::new();
        let mut segment = self.cursor.pos();
        let mut interpolated = false;
        loop {
            match self.cursor.peek() {
                None => return Err(ParseError::new(start, ParseErrorKind::UnterminatedString)),
                Some(b'"') => {
                    out.extend_from_slice(&src.as_bytes()[segment..self.cursor.pos()]);
                    self.cursor.bump();
                    if interpolated {
                        return Ok(None);
                    }
                    return Ok(String::from_utf8(out).ok());
                }
                Some(b'$') if self.cursor.peek_at(1).is_some_and(|b| is_ident_start(b) || b == b'{') => {
                    interpolated = true;
                    self.cursor.bump();
                }
                Some(b'{') if self.cursor.peek_at(1) == Some(b'$') => {
                    interpolated = true;
                    self.cursor.bump();
                }
                Some(b'\\') => {
                    out.extend_from_slice(&src.as_bytes()[segment..self.cursor.pos()]);
                    self.parse_escape(&mut out)?;
                    segment = self.cursor.pos();
                }
                Some(_) => self.cursor.bump(),
            }
        }
    }

    /// Decode one escape sequence; the cursor is on the backslash.
    ///
    /// Octal and `\x` escapes produce raw bytes, so `"\xC3\xA9"` is `é`.
    fn parse_escape(&mut self, out: &mut Vec<u8>) -> Result<(), ParseError> {
        let at = self.cursor.pos();
        self.cursor.bump();
        let Some(b) = self.cursor.peek() else {
            return Err(ParseError::new(at, ParseErrorKind::UnterminatedString));
        };
        let simple = match b {
            b'n' => Some(b'\n'),
            b't' => Some(b'\t'),
            b'r' => Some(b'\r'),
            b'v' => Some(0x0B),
            b'e' => Some(0x1B),
            b'f' => Some(0x0C),
            b'\\' => Some(b'\\'),
            b'$' => Some(b'$'),
            b'"' => Some(b'"'),
            _ => None,
        };
        if let Some(byte) = simple {
            out.push(byte);
            self.cursor.bump();
            return Ok(());
        }

        match b {
            b'0'..=b'7' => {
                let digits = self.take_while_max(3, |b| (b'0'..=b'7').contains(&b));
                let code = u32::from_str_radix(digits, 8).unwrap_or(0) & 0xFF;
                out.push(code as u8);
            }
            b'x' if self.cursor.peek_at(1).is_some_and(|b| b.is_ascii_hexdigit()) => {
                self.cursor.bump();
                let digits = self.take_while_max(2, |b| b.is_ascii_hexdigit());
                out.push(u8::from_str_radix(digits, 16).unwrap_or(0));
            }
            b'u' if self.cursor.peek_at(1) == Some(b'{') => {
                self.cursor.advance(2);
                let digits = self.take_while_max(6, |b| b.is_ascii_hexdigit());
                let sequence = format!("\\u{{{}", digits);
                if self.cursor.peek() != Some(b'}') {
                    return Err(ParseError::new(at, ParseErrorKind::InvalidEscape(sequence)));
                }
                self.cursor.bump();
                let c = u32::from_str_radix(digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        ParseError::new(at, ParseErrorKind::InvalidEscape(format!("{}}}", sequence)))
                    })?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            _ => {
                // PHP keeps unknown escapes verbatim.
                out.push(b'\\');
            }
        }
        Ok(())
    }

    fn take_while_max(&mut self, max: usize, pred: impl Fn(u8) -> bool) -> &'a str {
        let src = self.cursor.src();
        let start = self.cursor.pos();
        let mut taken = 0;
        while taken < max && self.cursor.peek().is_some_and(&pred) {
            self.cursor.bump();
            taken += 1;
        }
        &src[start..self.cursor.pos()]
    }

    fn starts_number_after_sign(&self) -> bool {
        match self.cursor.peek_at(1) {
            Some(b) if b.is_ascii_digit() => true,
            Some(b'.') => self.cursor.peek_at(2).is_some_and(|b| b.is_ascii_digit()),
            _ => false,
        }
    }

    /// A number, or the raw text when it is too large for a finite float.
    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let src = self.cursor.src();
        let start = self.cursor.pos();
        let negative = match self.cursor.peek() {
            Some(b'-') => {
                self.cursor.bump();
                true
            }
            Some(b'+') => {
                self.cursor.bump();
                false
            }
            _ => false,
        };

        let radix = match (self.cursor.peek(), self.cursor.peek_at(1)) {
            (Some(b'0'), Some(b'x' | b'X')) => Some(16),
            (Some(b'0'), Some(b'b' | b'B')) => Some(2),
            (Some(b'0'), Some(b'o' | b'O')) => Some(8),
            _ => None,
        };

        let number = if let Some(radix) = radix {
            self.cursor.advance(2);
            let digits_start = self.cursor.pos();
            while self
                .cursor
                .peek()
                .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
            {
                self.cursor.bump();
            }
            let digits: String = src[digits_start..self.cursor.pos()]
                .chars()
                .filter(|&c| c != '_')
                .collect();
            parse_radix(&digits, radix, negative)
        } else {
            let digits_start = self.cursor.pos();
            let mut is_float = false;
            self.skip_digits();
            if self.cursor.peek() == Some(b'.')
                && !self.cursor.peek_at(1).is_some_and(|b| b == b'.')
            {
                is_float = true;
                self.cursor.bump();
                self.skip_digits();
            }
            if matches!(self.cursor.peek(), Some(b'e' | b'E')) {
                let sign = usize::from(matches!(self.cursor.peek_at(1), Some(b'+' | b'-')));
                if self.cursor.peek_at(1 + sign).is_some_and(|b| b.is_ascii_digit()) {
                    is_float = true;
                    self.cursor.advance(1 + sign);
                    self.skip_digits();
                }
            }
            let digits: String = src[digits_start..self.cursor.pos()]
                .chars()
                .filter(|&c| c != '_')
                .collect();
            if is_float {
                digits
                    .parse::<f64>()
                    .ok()
                    .map(|x| Number::Float(if negative { -x } else { x }))
            } else if digits.len() > 1 && digits.starts_with('0') {
                parse_radix(&digits[1..], 8, negative)
            } else {
                parse_radix(&digits, 10, negative)
            }
        };

        let text = &src[start..self.cursor.pos()];
        if self.cursor.peek().is_some_and(is_ident_byte) {
            return Err(ParseError::new(
                start,
                ParseErrorKind::InvalidNumber(format!("{}{}", text, self.cursor.peek_char())),
            ));
        }
        match number {
            Some(Number::Float(x)) if !x.is_finite() => {
                trace!(offset = start, text, "Kept out-of-range number as constant reference");
                Ok(Value::Const(text.to_string()))
            }
            Some(n) => Ok(Value::Number(n)),
            None => Err(ParseError::new(start, ParseErrorKind::InvalidNumber(text.to_string()))),
        }
    }

    fn skip_digits(&mut self) {
        while self
            .cursor
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || b == b'_')
        {
            self.cursor.bump();
        }
    }
}

/// Integer in the given radix; overflow becomes a float like PHP does.
/// The sign is applied before the range check so `i64::MIN` stays an integer.
fn parse_radix(digits: &str, radix: u32, negative: bool) -> Option<Number> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let signed = if negative {
        format!("-{}", digits)
    } else {
        digits.to_string()
    };
    match i64::from_str_radix(&signed, radix) {
        Ok(n) => Some(Number::Int(n)),
        Err(_) => {
            let mut acc = 0f64;
            for c in digits.chars() {
                acc = acc * f64::from(radix) + f64::from(c.to_digit(radix)?);
            }
            Some(Number::Float(if negative { -acc } else { acc }))
        }
    }
}

fn is_operator(b: u8) -> bool {
    matches!(
        b,
        b'.' | b'+'
            | b'-'
            | b'*'
            | b'/'
            | b'%'
            | b'?'
            | b':'
            | b'|'
            | b'&'
            | b'^'
            | b'<'
            | b'>'
            | b'!'
            | b'='
            | b'('
            | b'['
            | b'{'
    )
}

fn to_key(value: Value, offset: usize) -> Result<Key, ParseError> {
    match value {
        Value::String(s) => Ok(Key::from_string(s)),
        Value::Number(Number::Int(n)) => Ok(Key::Int(n)),
        Value::Number(Number::Float(x)) => Ok(Key::Int(x.trunc() as i64)),
        Value::Bool(b) => Ok(Key::Int(i64::from(b))),
        Value::Null => Ok(Key::Str(String::new())),
        Value::Const(raw) => Ok(Key::Const(raw)),
        other => Err(ParseError::new(offset, ParseErrorKind::InvalidKey(other.kind()))),
    }
}
