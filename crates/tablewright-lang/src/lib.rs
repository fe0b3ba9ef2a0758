//! Tablewright DDL language support
//!
//! This crate lexes, classifies and parses the table-shaping subset of SQL
//! DDL found in migration files, for PostgreSQL and SQLite (and the common
//! MySQL spellings that show up alongside them).
//!
//! # Recognized statements
//!
//! ```text
//! CREATE [TEMP|TEMPORARY|UNLOGGED] TABLE [IF NOT EXISTS] [schema.]name (...)
//! ALTER TABLE [IF EXISTS] [ONLY] [schema.]name action[, action ...]
//! DROP TABLE [IF EXISTS] name[, name ...] [CASCADE|RESTRICT]
//! ```
//!
//! Everything else (indexes, views, functions, inserts) classifies as
//! "other" and parses to [`Statement::Other`] without error.
//!
//! # Usage
//!
//! ```rust
//! use tablewright_lang::{classify, parse, DdlKind, Statement};
//!
//! let sql = "ALTER TABLE users ADD COLUMN age integer";
//! assert_eq!(classify(sql).unwrap().kind, DdlKind::AlterTable);
//!
//! let stmt = parse(sql).unwrap();
//! assert!(matches!(stmt, Statement::AlterTable(_)));
//! ```

pub mod ast;
pub mod classify;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

// Re-export main types
pub use ast::{
    AlterAction, AlterTable, ColumnChange, ColumnConstraint, ColumnDef, CreateTable, DropTable,
    ForeignKeyRef, ObjectName, Statement, TableConstraint, TableSource,
};
pub use classify::{Classification, DdlKind};
pub use error::ParseError;
pub use span::{Location, Span, Spanned};

/// Classify a raw statement by its leading keywords.
///
/// Returns `None` for anything that is not CREATE, ALTER or DROP TABLE.
pub fn classify(sql: &str) -> Option<Classification> {
    classify::classify(sql)
}

/// Parse a raw statement into an AST.
///
/// # Example
///
/// ```rust
/// use tablewright_lang::{parse, Statement};
///
/// let stmt = parse("CREATE TABLE users (id uuid PRIMARY KEY)").unwrap();
/// if let Statement::CreateTable(table) = stmt {
///     assert_eq!(table.columns[0].name.value, "id");
/// }
/// ```
pub fn parse(sql: &str) -> Result<Statement, ParseError> {
    parser::parse(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_and_parse_agree() {
        let statements = [
            "CREATE TABLE a (id uuid)",
            "ALTER TABLE a ADD COLUMN b text",
            "DROP TABLE a",
            "CREATE VIEW v AS SELECT 1",
            "COMMENT ON TABLE a IS 'x'",
        ];
        for sql in statements {
            let classified = classify(sql).map(|c| c.kind);
            let parsed = match parse(sql).unwrap() {
                Statement::CreateTable(_) => Some(DdlKind::CreateTable),
                Statement::AlterTable(_) => Some(DdlKind::AlterTable),
                Statement::DropTable(_) => Some(DdlKind::DropTable),
                Statement::Other => None,
            };
            assert_eq!(classified, parsed, "{}", sql);
        }
    }

    #[test]
    fn test_parse_error_renders_with_source() {
        let sql = "CREATE TABLE t (\n  id uuid NOT DEFAULT 1\n)";
        let err = parse(sql).unwrap_err();
        let rendered = err.format_with_source(sql);
        assert!(rendered.contains("line 2:15"), "{}", rendered);
        assert!(rendered.contains("expected NULL"));
    }
}
