//! Post-replay primary-key validation.

use super::error::PrimaryKeyError;
use crate::catalog::Table;
use crate::config::IdentityPolicy;
use crate::dialect::Dialect;
use crate::typemap::normalize;

/// Normalized types accepted as a primary key under [`IdentityPolicy::Uuid`].
pub fn identity_types(dialect: Dialect) -> &'static [&'static str] {
    match dialect {
        Dialect::Postgres => &["uuid"],
        // No native UUID; stored as text.
        Dialect::Sqlite => &["uuid", "text"],
    }
}

/// Check that `table` has a single-column primary key of an accepted type.
pub fn validate_primary_key_datatype(
    table: &Table,
    dialect: Dialect,
    policy: IdentityPolicy,
) -> Result<(), PrimaryKeyError> {
    if table.primary_key.is_empty() {
        return Err(PrimaryKeyError::Missing {
            dialect,
            table: table.table_name(),
        });
    }
    if table.has_composite_key() {
        return Err(PrimaryKeyError::Composite {
            dialect,
            table: table.table_name(),
            columns: table.primary_key.clone(),
        });
    }
    if policy == IdentityPolicy::Any {
        return Ok(());
    }

    let Some(column) = table.primary_key_column() else {
        return Err(PrimaryKeyError::Missing {
            dialect,
            table: table.table_name(),
        });
    };
    let expected = identity_types(dialect);
    if expected.contains(&normalize(&column.data_type).as_str()) {
        Ok(())
    } else {
        Err(PrimaryKeyError::IncompatibleType {
            dialect,
            table: table.table_name(),
            column: column.name.clone(),
            data_type: column.data_type.clone(),
            expected: expected.to_vec(),
        })
    }
}
