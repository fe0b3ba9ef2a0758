//! Byte ranges into a statement and their line/column locations.

use std::fmt;
use std::ops::Range;

/// Half-open byte range `start..end` within one statement's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span containing both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The covered text; empty when the range falls outside `source`.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or_default()
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// A parsed value paired with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    /// Transform the value, keeping the span.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned::new(f(self.value), self.span)
    }
}

/// A 1-based line and column, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Locate byte `offset` within `source`.
    pub fn of(source: &str, offset: usize) -> Self {
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Location { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Collapse every run of whitespace in `text` into a single space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_span_covers_both() {
        assert_eq!(Span::new(5, 10).merge(Span::new(8, 15)), Span::new(5, 15));
        assert_eq!(Span::new(8, 15).merge(Span::new(5, 10)), Span::new(5, 15));
    }

    #[test]
    fn map_keeps_the_span() {
        let name = Spanned::new("users", Span::new(13, 18)).map(str::len);
        assert_eq!(name, Spanned::new(5, Span::new(13, 18)));
    }

    #[test]
    fn locations_are_one_based() {
        let source = "CREATE TABLE t (\n  id int\n)";

        assert_eq!(Location::of(source, 0), Location { line: 1, column: 1 });
        assert_eq!(Location::of(source, 7), Location { line: 1, column: 8 });
        assert_eq!(Location::of(source, 17), Location { line: 2, column: 1 });
        assert_eq!(Location::of(source, 19).to_string(), "2:3");
        assert_eq!(Location::of(source, 500).line, 3);
    }

    #[test]
    fn slice_and_collapse() {
        let source = "timestamp   with\n time zone";
        assert_eq!(Span::new(0, 9).slice(source), "timestamp");
        assert_eq!(Span::new(0, 999).slice(source), "");
        assert_eq!(collapse_whitespace(source), "timestamp with time zone");
    }
}
