//! Tablewright Core - schema reconstruction and type mapping.
//!
//! This crate rebuilds a table's schema by replaying a project's migration
//! files instead of querying a live database, then maps each column to
//! Go field and driver wire types for PostgreSQL (pgx) or SQLite
//! (`database/sql`).
//!
//! ```no_run
//! use tablewright_core::{Dialect, SchemaBuilder, SchemaConfig};
//!
//! let builder = SchemaBuilder::new(SchemaConfig::new(Dialect::Postgres, "db/migrations"));
//! let users = builder.build_table("public", "users")?;
//! for field in &users.fields {
//!     println!("{} {}", field.go_name, field.mapping.field_type);
//! }
//! # Ok::<(), tablewright_core::Error>(())
//! ```

pub mod builder;
pub mod catalog;
pub mod config;
pub mod dialect;
pub mod error;
pub mod migration;
pub mod replay;
pub mod resolve;
pub mod typemap;

pub use builder::SchemaBuilder;
pub use catalog::{Catalog, Column, ColumnRole, ForeignKey, NotFoundError, Table, TableName};
pub use config::{IdentityPolicy, SchemaConfig};
pub use dialect::{Dialect, UnknownDialect};
pub use error::{Error, Result};
pub use migration::{discover, DiscoveryError, Migration, MigrationStatement};
pub use replay::{
    validate_primary_key_datatype, ApplyError, ApplyErrorKind, DdlApplier, Outcome,
    PrimaryKeyError, ReplayReport, Replayer,
};
pub use resolve::{resolve_table, ResolvedField, ResolvedTable};
pub use typemap::{
    normalize, DialectTypeMapper, PostgresTypeMapper, ReadExpr, SqliteTypeMapper, TypeMapping,
};

/// Re-export the DDL parser.
pub use tablewright_lang as lang;
