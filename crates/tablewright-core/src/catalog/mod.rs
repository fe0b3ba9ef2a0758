//! Schema catalog reconstructed from migrations.
//!
//! The catalog stores tables, columns, primary keys and foreign keys exactly
//! as the replayed DDL left them.

mod catalog;
mod column;
mod table;

pub use catalog::{Catalog, NotFoundError};
pub use column::{Column, ColumnRole, ForeignKey};
pub use table::{Table, TableName};
