//! Source positions and spans for query text.
//!
//! Every token and every reported error carries a [`Span`] so diagnostics can
//! point at the exact place in the query string. Lines and columns are
//! one-based; offsets are zero-based byte offsets into the source.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single point in the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Byte offset into the source.
    pub offset: usize,
    /// One-based line number.
    pub line: u32,
    /// One-based column number. Tabs count as one column.
    pub column: u32,
}

impl Position {
    /// Position of the first character of the source.
    pub fn start() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance past a single character.
    pub fn advance(&mut self, ch: char) {
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Advance past every character of `text`.
    pub fn advance_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.advance(ch);
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open region of the query text, `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start.offset <= end.offset, "span start after end");
        Span { start, end }
    }

    /// Zero-width span at a single position.
    pub fn single(position: Position) -> Self {
        Span {
            start: position,
            end: position,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start.offset && offset < self.end.offset
    }

    /// The source text this span covers, if in bounds on char boundaries.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start.offset..self.end.offset)
    }

    /// Placeholder span for synthesized tokens.
    pub fn dummy() -> Span {
        Span::single(Position::start())
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A value paired with the span it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Spanned { value, span }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Spanned<U> {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }

    pub fn as_ref(&self) -> Spanned<&T> {
        Spanned {
            value: &self.value,
            span: self.span,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Owns a copy of the query text and knows where its lines start.
///
/// Used to render caret-style error context for log output.
#[derive(Debug, Clone)]
pub struct SourceMap {
    source: String,
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        SourceMap {
            source: source.to_string(),
            line_starts,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of a one-based line, without the trailing newline.
    pub fn get_line(&self, line: u32) -> Option<&str> {
        let index = line.checked_sub(1)? as usize;
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());
        self.source.get(start..end)
    }

    /// Position of a byte offset, computed from the line table.
    pub fn position_at(&self, offset: usize) -> Position {
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let line_start = self.line_starts[line_index];
        let column = self.source[line_start..offset.min(self.source.len())]
            .chars()
            .count() as u32
            + 1;
        Position {
            offset,
            line: line_index as u32 + 1,
            column,
        }
    }

    pub fn span_text(&self, span: &Span) -> Option<&str> {
        span.slice(&self.source)
    }

    /// Render a caret-underlined error message for `span`.
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let line = span.start.line;
        let mut output = format!("Error: {}\n  --> {}\n", message, span.start);
        if let Some(text) = self.get_line(line) {
            let gutter = format!("{}", line);
            output.push_str(&format!("{:>width$} | {}\n", "", text, width = gutter.len()));
            let caret_count = if span.end.line == line {
                (span.end.column.saturating_sub(span.start.column)).max(1) as usize
            } else {
                1
            };
            output.push_str(&format!(
                "{:>width$} | {}{}\n",
                "",
                " ".repeat(span.start.column.saturating_sub(1) as usize),
                "^".repeat(caret_count),
                width = gutter.len()
            ));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance() {
        let mut pos = Position::start();
        pos.advance('a');
        assert_eq!(pos.offset, 1);
        assert_eq!(pos.column, 2);

        pos.advance('\n');
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);

        pos.advance_str("abc");
        assert_eq!(pos.column, 4);
        assert_eq!(pos.offset, 5);
    }

    #[test]
    fn test_position_advance_multibyte() {
        let mut pos = Position::start();
        pos.advance('é');
        assert_eq!(pos.offset, 2);
        assert_eq!(pos.column, 2);
    }

    #[test]
    fn test_span_merge() {
        let mut a_end = Position::start();
        a_end.advance_str("abc");
        let a = Span::new(Position::start(), a_end);

        let mut b_start = Position::start();
        b_start.advance_str("abcd");
        let mut b_end = b_start;
        b_end.advance_str("ef");
        let b = Span::new(b_start, b_end);

        let merged = a.merge(b);
        assert_eq!(merged.start.offset, 0);
        assert_eq!(merged.end.offset, 6);
    }

    #[test]
    fn test_span_slice() {
        let source = "FROM method AS m";
        let mut start = Position::start();
        start.advance_str("FROM ");
        let mut end = start;
        end.advance_str("method");
        let span = Span::new(start, end);
        assert_eq!(span.slice(source), Some("method"));
        assert_eq!(span.len(), 6);
    }

    #[test]
    fn test_spanned_map() {
        let spanned = Spanned::new(41, Span::dummy());
        let mapped = spanned.map(|n| n + 1);
        assert_eq!(mapped.value, 42);
    }

    #[test]
    fn test_source_map_lines() {
        let map = SourceMap::new("FROM method AS m\nWHERE m\nSELECT m");
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.get_line(1), Some("FROM method AS m"));
        assert_eq!(map.get_line(2), Some("WHERE m"));
        assert_eq!(map.get_line(3), Some("SELECT m"));
        assert_eq!(map.get_line(4), None);
    }

    #[test]
    fn test_source_map_position_at() {
        let map = SourceMap::new("ab\ncd");
        let pos = map.position_at(3);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);
    }

    #[test]
    fn test_format_error_points_at_span() {
        let map = SourceMap::new("FROM method AS m");
        let mut start = Position::start();
        start.advance_str("FROM ");
        let mut end = start;
        end.advance_str("method");
        let span = Span::new(start, end);

        let rendered = map.format_error(&span, "test message");
        assert!(rendered.contains("test message"));
        assert!(rendered.contains("FROM method AS m"));
        assert!(rendered.contains("^^^^^^"));
    }
}
