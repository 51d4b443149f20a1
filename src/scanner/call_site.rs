//! Locating registration calls in PHP source.
//!
//! The search understands just enough PHP to avoid false hits: it starts in
//! inline-HTML mode, switches to code at `<?php`/`<?=`/`<?` and back at `?>`,
//! and skips comments, strings and heredocs. Method calls, static calls and
//! function definitions with the same name are ignored.

use crate::literal::cursor::{is_ident_byte, is_ident_start};
use crate::literal::{Cursor, ParseError};
use std::ops::Range;
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    /// Byte offset of the function name.
    pub offset: usize,
    /// Source span of the first argument, trimmed of surrounding trivia.
    pub argument: Result<Range<usize>, ParseError>,
}

pub fn find_call_sites(source: &str, function_name: &str) -> Vec<CallSite> {
    let mut sites = Vec::new();
    let mut cursor = Cursor::new(source, 0);
    if !enter_code(&mut cursor) {
        return sites;
    }

    loop {
        if let Err(e) = cursor.skip_trivia() {
            trace!(error = %e, "Stopped call-site search");
            break;
        }
        let Some(b) = cursor.peek() else { break };
        match b {
            b'?' if cursor.peek_at(1) == Some(b'>') => {
                cursor.advance(2);
                if !enter_code(&mut cursor) {
                    break;
                }
            }
            b'\'' | b'"' | b'`' => {
                if let Err(e) = cursor.skip_string() {
                    trace!(error = %e, "Stopped call-site search");
                    break;
                }
            }
            b'<' if cursor.starts_with("<<<") => {
                if let Err(e) = cursor.skip_heredoc() {
                    trace!(error = %e, "Stopped call-site search");
                    break;
                }
            }
            b'$' => {
                cursor.bump();
                let len = cursor.ident_len();
                cursor.advance(len);
            }
            _ if is_ident_start(b) => {
                let start = cursor.pos();
                let len = cursor.ident_len();
                cursor.advance(len);
                if !source[start..start + len].eq_ignore_ascii_case(function_name)
                    || !is_plain_call(source, start)
                {
                    continue;
                }
                let mut probe = cursor.clone();
                if probe.skip_trivia().is_ok() && probe.peek() == Some(b'(') {
                    probe.bump();
                    let args_start = probe.pos();
                    trace!(offset = start, "Found call site");
                    sites.push(CallSite {
                        offset: start,
                        argument: argument_span(source, args_start),
                    });
                    cursor.set_pos(args_start);
                }
            }
            _ => cursor.bump(),
        }
    }
    sites
}

/// First argument of a call whose `(` ends right before `args_start`.
pub fn argument_span(source: &str, args_start: usize) -> Result<Range<usize>, ParseError> {
    let mut cursor = Cursor::new(source, args_start);
    cursor.skip_trivia()?;
    let start = cursor.pos();
    let end = cursor.skip_expression(|c| matches!(c.peek(), Some(b',' | b')')))?;
    Ok(start..end)
}

/// Move past the next PHP open tag; `false` when there is none.
fn enter_code(cursor: &mut Cursor<'_>) -> bool {
    let rest = &cursor.src()[cursor.pos()..];
    let Some(at) = rest.find("<?") else {
        cursor.set_pos(cursor.src().len());
        return false;
    };
    cursor.advance(at + 2);
    if cursor.starts_with_ignore_case("php") {
        cursor.advance(3);
    } else if cursor.starts_with("=") {
        cursor.bump();
    }
    true
}

/// Not `->name(`, `::name(`, `$name(` or `function name(`.
fn is_plain_call(source: &str, start: usize) -> bool {
    let before = source[..start].trim_end();
    if before.ends_with("->") || before.ends_with("::") || before.ends_with('$') {
        return false;
    }
    if let Some(head) = before.strip_suffix("function")
        && !head.bytes().last().is_some_and(is_ident_byte)
    {
        return false;
    }
    true
}
