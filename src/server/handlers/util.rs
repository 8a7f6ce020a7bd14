use crate::types::Span;
use compact_str::CompactString;
use ropey::Rope;
use std::path::Path;
use tower_lsp::lsp_types::{Position, Range};

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// The identifier-like word touching `position`, with its range.
///
/// Mirrors an editor's "word at cursor": the cursor may sit anywhere inside
/// the word or directly after its last character. `position.character` and
/// the returned range count UTF-16 code units.
pub(crate) fn word_at_position(content: &str, position: Position) -> Option<(CompactString, Range)> {
    let rope = Rope::from_str(content);
    let line_idx = position.line as usize;
    if line_idx >= rope.len_lines() {
        return None;
    }

    let chars: Vec<char> = rope.line(line_idx).chars().collect();
    let cursor = char_index(&chars, position.character);

    let start = chars[..cursor]
        .iter()
        .rposition(|c| !is_word_char(*c))
        .map_or(0, |i| i + 1);
    let end = chars[cursor..]
        .iter()
        .position(|c| !is_word_char(*c))
        .map_or(chars.len(), |i| cursor + i);

    if start == end || chars[start].is_ascii_digit() {
        return None;
    }

    let word: CompactString = chars[start..end].iter().collect();
    let range = Range::new(
        Position::new(position.line, utf16_len(&chars[..start])),
        Position::new(position.line, utf16_len(&chars[..end])),
    );
    Some((word, range))
}

/// Char index of a UTF-16 offset, clamped to the line.
fn char_index(chars: &[char], utf16_offset: u32) -> usize {
    let mut units = 0;
    for (index, c) in chars.iter().enumerate() {
        if units >= utf16_offset {
            return index;
        }
        units += c.len_utf16() as u32;
    }
    chars.len()
}

fn utf16_len(chars: &[char]) -> u32 {
    chars.iter().map(|c| c.len_utf16() as u32).sum()
}

/// Analyzer lines are 1-based, LSP lines are 0-based.
pub(crate) fn span_to_range(span: Span) -> Range {
    Range::new(
        Position::new(span.start.line.saturating_sub(1), span.start.column),
        Position::new(span.end.line.saturating_sub(1), span.end.column),
    )
}

pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
