//! Literal parser error types.

use thiserror::Error;

/// What went wrong while reading a literal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated block comment")]
    UnterminatedComment,

    #[error("unterminated heredoc")]
    UnterminatedHeredoc,

    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unbalanced '{0}'")]
    Unbalanced(char),

    #[error("mismatched delimiter: expected '{expected}', found '{found}'")]
    MismatchedDelimiter { expected: char, found: char },

    #[error("expected an array literal")]
    ExpectedArray,

    #[error("expected a value")]
    ExpectedValue,

    #[error("expected ',' or closing delimiter, found '{0}'")]
    ExpectedSeparator(char),

    #[error("invalid numeric literal '{0}'")]
    InvalidNumber(String),

    #[error("invalid escape sequence '{0}'")]
    InvalidEscape(String),

    #[error("a {0} cannot be used as an array key")]
    InvalidKey(&'static str),

    #[error("entry collides with key {0} given earlier in the literal")]
    KeyCollision(String),

    #[error("literal nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("unexpected input after literal")]
    TrailingInput,
}

/// A parse failure at a byte offset into the scanned source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    pub offset: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(offset: usize, kind: ParseErrorKind) -> Self {
        Self { offset, kind }
    }

    /// Shift the offset, for errors raised on a sub-slice.
    pub fn with_base(mut self, base: usize) -> Self {
        self.offset += base;
        self
    }
}
