//! Replay error types.

use crate::catalog::TableName;
use crate::dialect::Dialect;
use std::path::PathBuf;
use tablewright_lang::ParseError;
use thiserror::Error;

/// A statement could not be applied to the catalog.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}:{}: {kind}", path.display(), line)]
pub struct ApplyError {
    /// Migration file containing the statement.
    pub path: PathBuf,
    /// 1-based line of the statement in that file.
    pub line: usize,
    /// Raw statement text.
    pub statement: String,
    /// Table the statement targets.
    pub table: TableName,
    /// What went wrong.
    #[source]
    pub kind: ApplyErrorKind,
}

impl ApplyError {
    /// Render the error with the statement underlined where possible.
    pub fn diagnostic(&self) -> String {
        let mut out = format!("{}:{}: {}\n", self.path.display(), self.line, self.kind);
        if let ApplyErrorKind::Malformed { error } = &self.kind {
            out.push_str(&error.format_with_source(&self.statement));
        } else {
            for line in self.statement.lines() {
                out.push_str("   | ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

/// The cause of an [`ApplyError`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApplyErrorKind {
    /// ALTER or DROP of a table that does not exist at this point in replay.
    #[error("table {table} does not exist")]
    UnknownTable {
        /// The missing table.
        table: TableName,
    },

    /// A referenced column does not exist.
    #[error("column {column} does not exist in table {table}")]
    UnknownColumn {
        /// The table.
        table: TableName,
        /// The missing column.
        column: String,
    },

    /// A column was declared twice.
    #[error("column {column} already exists in table {table}")]
    DuplicateColumn {
        /// The table.
        table: TableName,
        /// The duplicate column.
        column: String,
    },

    /// RENAME TO a name that is taken.
    #[error("table {table} already exists")]
    TableExists {
        /// The existing table.
        table: TableName,
    },

    /// The statement classified as table DDL but did not parse.
    #[error("malformed statement: {error}")]
    Malformed {
        /// The parse failure.
        #[source]
        error: ParseError,
    },

    /// The statement is valid SQL but cannot be replayed.
    #[error("unsupported statement: {reason}")]
    Unsupported {
        /// Why.
        reason: String,
    },
}

/// The replayed primary key breaks the dialect's identity convention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrimaryKeyError {
    /// No primary key declared.
    #[error("{dialect}: table {table} has no primary key")]
    Missing {
        /// Target dialect.
        dialect: Dialect,
        /// The table.
        table: TableName,
    },

    /// The key spans several columns.
    #[error("{dialect}: table {table} has a composite primary key ({})", columns.join(", "))]
    Composite {
        /// Target dialect.
        dialect: Dialect,
        /// The table.
        table: TableName,
        /// Key columns in order.
        columns: Vec<String>,
    },

    /// The key column has the wrong type.
    #[error(
        "{dialect}: primary key {table}.{column} has type {data_type}, expected {}",
        expected.join(" or ")
    )]
    IncompatibleType {
        /// Target dialect.
        dialect: Dialect,
        /// The table.
        table: TableName,
        /// The key column.
        column: String,
        /// Declared type.
        data_type: String,
        /// Accepted normalized types.
        expected: Vec<&'static str>,
    },
}
