//! Abstract Syntax Tree types for the DDL statements we replay.

use crate::span::{Span, Spanned};
use std::fmt;

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `CREATE TABLE`.
    CreateTable(CreateTable),
    /// `ALTER TABLE`.
    AlterTable(AlterTable),
    /// `DROP TABLE`.
    DropTable(DropTable),
    /// Anything that does not change the shape of a table (indexes, views,
    /// inserts, functions, ...).
    Other,
}

impl Statement {
    /// Get the span of this statement, if it was parsed.
    pub fn span(&self) -> Option<Span> {
        match self {
            Statement::CreateTable(c) => Some(c.span),
            Statement::AlterTable(a) => Some(a.span),
            Statement::DropTable(d) => Some(d.span),
            Statement::Other => None,
        }
    }
}

/// A possibly schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectName {
    /// Schema qualifier, as written (after case folding).
    pub schema: Option<String>,
    /// The unqualified name.
    pub name: String,
}

impl ObjectName {
    /// An unqualified name.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// A schema-qualified name.
    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// `CREATE [TEMP|UNLOGGED] TABLE [IF NOT EXISTS] name (...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: Spanned<ObjectName>,
    pub if_not_exists: bool,
    pub temporary: bool,
    /// Column definitions in declaration order.
    pub columns: Vec<ColumnDef>,
    /// Table-level constraints in declaration order.
    pub constraints: Vec<TableConstraint>,
    /// Where the table's shape comes from.
    pub source: TableSource,
    pub span: Span,
}

/// How a `CREATE TABLE` defines its columns.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    /// An explicit column list.
    Definition,
    /// `CREATE TABLE ... AS SELECT ...`.
    Query,
    /// `CREATE TABLE ... (LIKE other ...)`.
    Like(ObjectName),
}

/// A column definition inside `CREATE TABLE` or `ADD COLUMN`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: Spanned<String>,
    /// The data type exactly as written, whitespace collapsed.
    pub data_type: String,
    pub constraints: Vec<ColumnConstraint>,
    pub span: Span,
}

impl ColumnDef {
    /// Whether the column carries an inline `PRIMARY KEY`.
    pub fn is_primary_key(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, ColumnConstraint::PrimaryKey { .. }))
    }

    /// Whether the column is declared `NOT NULL` (or implied by `PRIMARY KEY`).
    ///
    /// When both `NULL` and `NOT NULL` appear the last one wins.
    pub fn is_not_null(&self) -> bool {
        let mut not_null = false;
        for constraint in &self.constraints {
            match constraint {
                ColumnConstraint::NotNull | ColumnConstraint::PrimaryKey { .. } => {
                    not_null = true
                }
                ColumnConstraint::Null => not_null = false,
                _ => {}
            }
        }
        not_null
    }

    /// The inline `REFERENCES` target, if any.
    pub fn references(&self) -> Option<&ForeignKeyRef> {
        self.constraints.iter().find_map(|c| match c {
            ColumnConstraint::References(r) => Some(r),
            _ => None,
        })
    }

    /// The last `DEFAULT` expression, if any.
    pub fn default_expr(&self) -> Option<&str> {
        self.constraints.iter().rev().find_map(|c| match c {
            ColumnConstraint::Default(expr) => Some(expr.as_str()),
            _ => None,
        })
    }

    /// Whether the column carries an inline `UNIQUE`.
    pub fn is_unique(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, ColumnConstraint::Unique))
    }
}

/// A constraint attached to a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraint {
    NotNull,
    Null,
    PrimaryKey {
        /// SQLite `AUTOINCREMENT`.
        autoincrement: bool,
    },
    Unique,
    References(ForeignKeyRef),
    /// Raw default expression.
    Default(String),
    Check,
    /// `GENERATED {ALWAYS|BY DEFAULT} AS {IDENTITY|(expr)}`.
    Generated {
        identity: bool,
    },
    Collate(String),
}

/// The target of a foreign key.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyRef {
    pub table: ObjectName,
    /// Referenced column. `None` means the referenced table's primary key.
    pub column: Option<String>,
}

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    PrimaryKey {
        name: Option<String>,
        columns: Vec<String>,
    },
    ForeignKey {
        name: Option<String>,
        columns: Vec<String>,
        table: ObjectName,
        referenced_columns: Vec<String>,
    },
    Unique {
        name: Option<String>,
        columns: Vec<String>,
    },
    Check {
        name: Option<String>,
    },
}

impl TableConstraint {
    /// The `CONSTRAINT name` attached to this constraint, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            TableConstraint::PrimaryKey { name, .. }
            | TableConstraint::ForeignKey { name, .. }
            | TableConstraint::Unique { name, .. }
            | TableConstraint::Check { name } => name.as_deref(),
        }
    }
}

/// `ALTER TABLE [IF EXISTS] [ONLY] name action[, action ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    pub name: Spanned<ObjectName>,
    pub if_exists: bool,
    /// Actions in the order written.
    pub actions: Vec<AlterAction>,
    pub span: Span,
}

/// One comma-separated clause of an `ALTER TABLE`.
#[derive(Debug, Clone, PartialEq)]
pub enum AlterAction {
    AddColumn {
        if_not_exists: bool,
        column: ColumnDef,
    },
    DropColumn {
        if_exists: bool,
        name: Spanned<String>,
    },
    AlterColumn {
        name: Spanned<String>,
        change: ColumnChange,
    },
    RenameColumn {
        from: Spanned<String>,
        to: String,
    },
    RenameTable {
        to: ObjectName,
    },
    AddConstraint(TableConstraint),
    DropConstraint {
        if_exists: bool,
        name: String,
    },
    /// MySQL `DROP PRIMARY KEY`.
    DropPrimaryKey,
    /// An action that does not affect columns (`OWNER TO`, `SET SCHEMA`,
    /// `ENABLE TRIGGER`, ...). Keeps the leading keyword for logging.
    Other {
        keyword: String,
    },
}

/// The change requested by `ALTER COLUMN`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnChange {
    /// `TYPE t` or `SET DATA TYPE t`; a trailing `USING` is discarded.
    SetType(String),
    SetNotNull,
    DropNotNull,
    SetDefault(String),
    DropDefault,
    /// Statistics, storage, identity options and the like.
    Other,
}

/// `DROP TABLE [IF EXISTS] a[, b ...] [CASCADE|RESTRICT]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTable {
    pub names: Vec<Spanned<ObjectName>>,
    pub if_exists: bool,
    pub span: Span,
}
