//! Errors raised while lexing or parsing a single DDL statement.

use crate::span::{Location, Span};
use std::fmt::{self, Write as _};
use thiserror::Error;

/// A statement that could not be lexed or parsed.
///
/// `Display` prints only the message; [`ParseError::format_with_source`]
/// renders it against the statement text with a caret under the span.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    /// Suggested fix, shown below the excerpt.
    pub hint: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// `found` appeared where `expected` was required.
    pub fn unexpected(expected: &str, found: impl fmt::Display, span: Span) -> Self {
        Self::new(format!("expected {expected}, found {found}"), span)
    }

    /// The statement ran out while `expected` was still required.
    pub fn unexpected_end(expected: &str, span: Span) -> Self {
        Self::new(format!("expected {expected}, found end of statement"), span)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// The error's position within `source`.
    pub fn location(&self, source: &str) -> Location {
        Location::of(source, self.span.start)
    }

    /// Render the message, the offending line and the hint.
    pub fn format_with_source(&self, source: &str) -> String {
        let at = self.location(source);
        let mut out = String::new();
        let _ = writeln!(out, "error: {}", self.message);
        let _ = writeln!(out, "  --> line {at}");

        if let Some(text) = source.lines().nth(at.line - 1) {
            let room = text.chars().count().saturating_sub(at.column - 1);
            let underline = "~".repeat(self.span.len().min(room).saturating_sub(1));
            let _ = writeln!(out, "   |\n{:3}| {}", at.line, text);
            let _ = writeln!(out, "   |{}^{}", " ".repeat(at.column), underline);
        }

        if let Some(hint) = &self.hint {
            let _ = writeln!(out, "   = hint: {hint}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting() {
        let source = "ALTER TABLE users ALTER COLUMN age SET NOT";
        let err = ParseError::unexpected_end("NULL", Span::new(39, 42))
            .with_hint("write SET NOT NULL or DROP NOT NULL");

        let formatted = err.format_with_source(source);
        assert!(formatted.contains("line 1:40"));
        assert!(formatted.contains("expected NULL, found end of statement"));
        assert!(formatted.contains("^~~"));
        assert!(formatted.contains("hint: write SET NOT NULL"));
    }

    #[test]
    fn test_error_on_second_line() {
        let source = "CREATE TABLE t (\n  id int PRIMARY\n)";
        let err = ParseError::unexpected("KEY", "')'", Span::new(34, 35));
        let formatted = err.format_with_source(source);
        assert!(formatted.contains("line 3:1"));
    }
}
