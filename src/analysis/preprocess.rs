//! Removal of placeholder ellipses before parsing.
//!
//! Template container files often elide registrations with a bare `...`,
//! which is not valid JavaScript. Spread syntax uses the same token, so an
//! ellipsis is only kept when it sits where a spread can: after `(`, `[`, `{`
//! or `,`, and in front of an operand that is not a `key:` pair. Placeholders
//! are blanked with spaces of the same width so every other token keeps its
//! line and column.

use crate::constants::PLACEHOLDER_ELLIPSIS;
use std::borrow::Cow;
use std::ops::Range;

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Quoted(u8),
    Regex { in_class: bool },
    LineComment,
    BlockComment,
}

/// Blank out placeholder ellipses. Text without any is returned borrowed.
pub fn strip_placeholders(text: &str) -> Cow<'_, str> {
    let placeholders = find_placeholders(text);
    if placeholders.is_empty() {
        return Cow::Borrowed(text);
    }

    tracing::debug!(count = placeholders.len(), "Blanking placeholder ellipses");

    let mut prepared = String::with_capacity(text.len());
    let mut last = 0;
    for range in placeholders {
        prepared.push_str(&text[last..range.start]);
        prepared.push_str(&" ".repeat(range.len()));
        last = range.end;
    }
    prepared.push_str(&text[last..]);

    Cow::Owned(prepared)
}

fn find_placeholders(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let width = PLACEHOLDER_ELLIPSIS.len();
    let mut found = Vec::new();
    let mut state = State::Code;
    // Last byte of the previous token, comments and placeholders excluded.
    let mut previous: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        match state {
            State::Code => {
                if bytes[i..].starts_with(PLACEHOLDER_ELLIPSIS.as_bytes()) {
                    if is_placeholder(bytes, previous, i + width) {
                        found.push(i..i + width);
                    } else {
                        previous = Some(b'.');
                    }
                    i += width;
                    continue;
                }
                match byte {
                    b'"' | b'\'' | b'`' => state = State::Quoted(byte),
                    b'/' if bytes.get(i + 1) == Some(&b'/') => {
                        state = State::LineComment;
                        i += 1;
                    }
                    b'/' if bytes.get(i + 1) == Some(&b'*') => {
                        state = State::BlockComment;
                        i += 1;
                    }
                    b'/' if starts_regex(previous) => state = State::Regex { in_class: false },
                    _ => {}
                }
                if !byte.is_ascii_whitespace()
                    && !matches!(state, State::LineComment | State::BlockComment)
                {
                    previous = Some(byte);
                }
            }
            State::Quoted(quote) => {
                if byte == b'\\' {
                    i += 1;
                } else if byte == quote {
                    state = State::Code;
                    previous = Some(byte);
                }
            }
            State::Regex { in_class } => match byte {
                b'\\' => i += 1,
                b'[' => state = State::Regex { in_class: true },
                b']' => state = State::Regex { in_class: false },
                b'/' if !in_class => {
                    state = State::Code;
                    previous = Some(byte);
                }
                // An unterminated regex is a division after all.
                b'\n' => state = State::Code,
                _ => {}
            },
            State::LineComment => {
                if byte == b'\n' {
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if byte == b'*' && bytes.get(i + 1) == Some(&b'/') {
                    state = State::Code;
                    i += 1;
                }
            }
        }
        i += 1;
    }

    found
}

/// A spread follows `(`, `[`, `{` or `,` and is followed by its operand.
/// Anything else in that position is a placeholder.
fn is_placeholder(bytes: &[u8], previous: Option<u8>, after: usize) -> bool {
    if !matches!(previous, Some(b'(' | b'[' | b'{' | b',')) {
        return true;
    }
    let Some(start) = next_significant(bytes, after) else {
        return true;
    };
    if matches!(bytes[start], b'}' | b']' | b')' | b',' | b';') {
        return true;
    }
    starts_key_value(bytes, start)
}

/// `name:` where a spread operand would be, e.g. the next registration.
fn starts_key_value(bytes: &[u8], start: usize) -> bool {
    let end = bytes[start..]
        .iter()
        .position(|byte| !is_identifier_byte(*byte))
        .map_or(bytes.len(), |offset| start + offset);
    if end == start || bytes[start].is_ascii_digit() {
        return false;
    }
    next_significant(bytes, end).is_some_and(|colon| bytes[colon] == b':')
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'$') || !byte.is_ascii()
}

/// A `/` starts a regex unless it follows something that ends an operand.
fn starts_regex(previous: Option<u8>) -> bool {
    match previous {
        None => true,
        Some(byte) => {
            !(is_identifier_byte(byte)
                || matches!(byte, b')' | b']' | b'}' | b'"' | b'\'' | b'`' | b'.'))
        }
    }
}

fn next_significant(bytes: &[u8], from: usize) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .map(|offset| from + offset)
}
