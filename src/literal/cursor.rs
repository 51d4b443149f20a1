//! Byte cursor over PHP source with trivia and delimiter skipping.
//!
//! Shared by the literal parser and the call-site scanner: both need to step
//! over comments and strings without interpreting them, and both need to find
//! the end of an expression by balancing `()`, `[]` and `{}`.

use super::error::{ParseError, ParseErrorKind};

pub(crate) fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str, pos: usize) -> Self {
        Self {
            src,
            pos: pos.min(src.len()),
        }
    }

    pub fn src(&self) -> &'a str {
        self.src
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.src.len());
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + n).copied()
    }

    /// Character at the cursor, for error messages.
    pub fn peek_char(&self) -> char {
        self.src
            .get(self.pos..)
            .and_then(|s| s.chars().next())
            .unwrap_or('\u{FFFD}')
    }

    pub fn bump(&mut self) {
        self.advance(1);
    }

    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.src.len());
    }

    pub fn starts_with(&self, s: &str) -> bool {
        self.src.as_bytes()[self.pos..].starts_with(s.as_bytes())
    }

    pub fn starts_with_ignore_case(&self, s: &str) -> bool {
        let rest = &self.src.as_bytes()[self.pos..];
        rest.len() >= s.len() && rest[..s.len()].eq_ignore_ascii_case(s.as_bytes())
    }

    /// Length in bytes of the identifier starting at the cursor (0 if none).
    pub fn ident_len(&self) -> usize {
        let rest = &self.src.as_bytes()[self.pos..];
        match rest.first() {
            Some(&b) if is_ident_start(b) => rest.iter().take_while(|&&b| is_ident_byte(b)).count(),
            _ => 0,
        }
    }

    pub fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.pos, kind)
    }

    fn at_comment(&self) -> bool {
        match self.peek() {
            Some(b'/') => matches!(self.peek_at(1), Some(b'/') | Some(b'*')),
            // `#[` opens an attribute, not a comment.
            Some(b'#') => self.peek_at(1) != Some(b'['),
            _ => false,
        }
    }

    /// Skip whitespace and `//`, `#`, `/* */` comments.
    pub fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() || b == 0x0B => self.bump(),
                Some(_) if self.at_comment() => self.skip_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), ParseError> {
        if self.starts_with("/*") {
            let start = self.pos;
            match self.src[self.pos + 2..].find("*/") {
                Some(end) => {
                    self.pos += 2 + end + 2;
                    Ok(())
                }
                None => Err(ParseError::new(start, ParseErrorKind::UnterminatedComment)),
            }
        } else {
            match self.src[self.pos..].find('\n') {
                Some(end) => self.pos += end + 1,
                None => self.pos = self.src.len(),
            }
            Ok(())
        }
    }

    /// Skip a quoted string; the cursor must be on the opening quote.
    pub fn skip_string(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let Some(quote) = self.peek() else {
            return Err(self.error(ParseErrorKind::UnexpectedEnd));
        };
        self.bump();
        loop {
            match self.peek() {
                None => return Err(ParseError::new(start, ParseErrorKind::UnterminatedString)),
                Some(b'\\') => self.advance(2),
                Some(b) if b == quote => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => self.bump(),
            }
        }
    }

    /// Skip a heredoc or nowdoc; the cursor must be on `<<<`.
    pub fn skip_heredoc(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        self.advance(3);
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.bump();
        }
        let quoted = matches!(self.peek(), Some(b'\'') | Some(b'"'));
        if quoted {
            self.bump();
        }
        let len = self.ident_len();
        if len == 0 {
            return Err(self.error(ParseErrorKind::UnexpectedChar(self.peek_char())));
        }
        let label = &self.src[self.pos..self.pos + len];
        self.advance(len);
        if quoted {
            self.bump();
        }
        let Some(newline) = self.src[self.pos..].find('\n') else {
            return Err(ParseError::new(start, ParseErrorKind::UnterminatedHeredoc));
        };
        self.pos += newline + 1;

        while !self.at_end() {
            let line_start = self.pos;
            while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
                self.bump();
            }
            if self.starts_with(label)
                && !self
                    .peek_at(label.len())
                    .is_some_and(is_ident_byte)
            {
                self.advance(label.len());
                return Ok(());
            }
            match self.src[line_start..].find('\n') {
                Some(end) => self.pos = line_start + end + 1,
                None => self.pos = self.src.len(),
            }
        }
        Err(ParseError::new(start, ParseErrorKind::UnterminatedHeredoc))
    }

    /// Advance to the first position at nesting depth zero where `stop`
    /// holds, stepping over strings, comments and bracketed groups.
    ///
    /// Returns the end offset of the last non-trivia byte consumed, so the
    /// caller can slice the expression without trailing comments.
    pub fn skip_expression<F>(&mut self, stop: F) -> Result<usize, ParseError>
    where
        F: Fn(&Cursor<'a>) -> bool,
    {
        let mut stack: Vec<u8> = Vec::new();
        let mut last_end = self.pos;
        loop {
            if stack.is_empty() && !self.at_end() && stop(self) {
                return Ok(last_end);
            }
            let Some(b) = self.peek() else {
                return Err(self.error(ParseErrorKind::UnexpectedEnd));
            };
            match b {
                _ if b.is_ascii_whitespace() => self.bump(),
                _ if self.at_comment() => self.skip_comment()?,
                b'\'' | b'"' | b'`' => {
                    self.skip_string()?;
                    last_end = self.pos;
                }
                b'<' if self.starts_with("<<<") => {
                    self.skip_heredoc()?;
                    last_end = self.pos;
                }
                b'(' => {
                    stack.push(b')');
                    self.bump();
                    last_end = self.pos;
                }
                b'[' => {
                    stack.push(b']');
                    self.bump();
                    last_end = self.pos;
                }
                b'{' => {
                    stack.push(b'}');
                    self.bump();
                    last_end = self.pos;
                }
                b')' | b']' | b'}' => {
                    match stack.pop() {
                        None => return Err(self.error(ParseErrorKind::Unbalanced(b as char))),
                        Some(expected) if expected != b => {
                            return Err(self.error(ParseErrorKind::MismatchedDelimiter {
                                expected: expected as char,
                                found: b as char,
                            }));
                        }
                        Some(_) => {}
                    }
                    self.bump();
                    last_end = self.pos;
                }
                _ => {
                    self.bump();
                    last_end = self.pos;
                }
            }
        }
    }
}
