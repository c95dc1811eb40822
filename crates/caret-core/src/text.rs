//! Text position utilities over line-based buffers.
//!
//! The engine stores files as lists of lines (no terminators), while syntax
//! trees address source text by byte offset into the joined file content
//! (lines joined with `\n`). This module converts between the two views.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Columns count Unicode scalar values, not bytes
//! - Byte offsets are **0-indexed** into the `\n`-joined content
//! - Line/column values of 0 are treated as 1

use crate::tree::Span;

// ============================================================================
// Offset Conversions
// ============================================================================

/// Convert 1-indexed line and column to a byte offset into the joined content.
///
/// Columns past the end of a line clamp to the line end; lines past the end of
/// the buffer clamp to the total content length.
pub fn position_to_offset<S: AsRef<str>>(lines: &[S], line: u32, col: u32) -> usize {
    let line = line.max(1) as usize;
    let col = col.max(1) as usize;

    let mut offset = 0usize;
    for (i, l) in lines.iter().enumerate() {
        let l = l.as_ref();
        if i + 1 == line {
            let mut within = 0usize;
            for (n, ch) in l.chars().enumerate() {
                if n + 1 == col {
                    return offset + within;
                }
                within += ch.len_utf8();
            }
            // Column beyond end of line: clamp to line end.
            return offset + l.len();
        }
        offset += l.len() + 1;
    }

    offset.saturating_sub(1)
}

/// Convert a byte offset into the joined content to 1-indexed line and column.
///
/// Offsets beyond the content clamp to the final position.
pub fn offset_to_position<S: AsRef<str>>(lines: &[S], offset: usize) -> (u32, u32) {
    let mut remaining = offset;
    let mut line = 1u32;

    for (i, l) in lines.iter().enumerate() {
        let l = l.as_ref();
        if remaining <= l.len() {
            let mut col = 1u32;
            let mut consumed = 0usize;
            for ch in l.chars() {
                if consumed >= remaining {
                    break;
                }
                consumed += ch.len_utf8();
                col += 1;
            }
            return (line, col);
        }
        remaining -= l.len() + 1;
        if i + 1 < lines.len() {
            line += 1;
        }
    }

    // Past the end: clamp to last line, one past its final character.
    let last = lines.last().map(|l| l.as_ref()).unwrap_or("");
    (line, last.chars().count() as u32 + 1)
}

/// Byte offset of the start of a 1-indexed line, or `None` past the end.
pub fn line_start_offset<S: AsRef<str>>(lines: &[S], line: u32) -> Option<usize> {
    if line == 0 || line as usize > lines.len() {
        return None;
    }
    let mut offset = 0usize;
    for l in lines.iter().take(line as usize - 1) {
        offset += l.as_ref().len() + 1;
    }
    Some(offset)
}

/// Byte span covering a full 1-indexed line (terminator excluded).
pub fn line_span<S: AsRef<str>>(lines: &[S], line: u32) -> Option<Span> {
    let start = line_start_offset(lines, line)?;
    let len = lines.get(line as usize - 1)?.as_ref().len();
    Some(Span::new(start, start + len))
}

// ============================================================================
// Span Utilities
// ============================================================================

/// Get the 1-indexed line range spanned by a byte span.
pub fn span_to_line_range<S: AsRef<str>>(lines: &[S], span: Span) -> (u32, u32) {
    let (start_line, _) = offset_to_position(lines, span.start);
    let (end_line, _) = offset_to_position(lines, span.end.saturating_sub(1).max(span.start));
    (start_line, end_line)
}

/// Extract the text content of a span from the joined content.
///
/// Returns `None` if the span extends beyond the content or splits a
/// character boundary.
pub fn extract_span<S: AsRef<str>>(lines: &[S], span: Span) -> Option<String> {
    let joined = join_lines(lines);
    joined.get(span.start..span.end).map(str::to_string)
}

/// Join lines with `\n` into the offset-addressable content.
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::new();
    for (i, l) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(l.as_ref());
    }
    out
}

/// Leading whitespace of a line.
pub fn leading_indent(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[..end]
}

// ============================================================================
// Tests
// ============================================================================
