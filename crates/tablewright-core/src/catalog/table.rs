//! Table definitions.

use super::column::{Column, ColumnRole};
use serde::Serialize;
use std::fmt;

/// Fully resolved table identifier. The default schema is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TableName {
    pub schema: String,
    pub name: String,
}

impl TableName {
    /// Create a table name.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// A name in the default schema.
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self::new("", name)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.schema.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.schema, self.name)
        }
    }
}

/// A reconstructed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Schema; empty for the default schema.
    pub schema: String,
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<Column>,
    /// Primary key column names, in key order.
    pub primary_key: Vec<String>,
    /// Name of the primary key constraint, when declared with `CONSTRAINT name`.
    pub primary_key_constraint: Option<String>,
}

impl Table {
    /// Create an empty table.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            primary_key_constraint: None,
        }
    }

    /// The table's resolved identifier.
    pub fn table_name(&self) -> TableName {
        TableName::new(self.schema.clone(), self.name.clone())
    }

    /// Add a column (builder style).
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self.refresh_roles();
        self
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get a mutable column by name.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Check whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// The single primary-key column, or `None` when the key is missing or
    /// composite.
    pub fn primary_key_column_name(&self) -> Option<&str> {
        match self.primary_key.as_slice() {
            [single] => Some(single.as_str()),
            _ => None,
        }
    }

    /// The single primary-key column definition.
    pub fn primary_key_column(&self) -> Option<&Column> {
        self.primary_key_column_name().and_then(|n| self.column(n))
    }

    /// Whether the primary key spans more than one column.
    pub fn has_composite_key(&self) -> bool {
        self.primary_key.len() > 1
    }

    /// Append a column.
    pub fn push_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Remove a column, dropping it from the primary key as well.
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let index = self.columns.iter().position(|c| c.name == name)?;
        self.primary_key.retain(|k| k != name);
        if self.primary_key.is_empty() {
            self.primary_key_constraint = None;
        }
        Some(self.columns.remove(index))
    }

    /// Rename a column in place. Returns false if `from` does not exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        let Some(column) = self.column_mut(from) else {
            return false;
        };
        column.name = to.to_string();
        for key in &mut self.primary_key {
            if key == from {
                *key = to.to_string();
            }
        }
        true
    }

    /// Replace the primary key. Key columns become NOT NULL.
    pub fn set_primary_key(&mut self, columns: Vec<String>, constraint: Option<String>) {
        for column in &mut self.columns {
            column.is_primary_key = columns.contains(&column.name);
            if column.is_primary_key {
                column.is_nullable = false;
            }
        }
        self.primary_key = columns;
        self.primary_key_constraint = constraint;
    }

    /// Remove the primary key. Columns keep their NOT NULL.
    pub fn clear_primary_key(&mut self) {
        for column in &mut self.columns {
            column.is_primary_key = false;
        }
        self.primary_key.clear();
        self.primary_key_constraint = None;
    }

    /// Recompute every column's role from the primary key and column names.
    pub fn refresh_roles(&mut self) {
        for column in &mut self.columns {
            column.role = if column.is_primary_key {
                ColumnRole::Identity
            } else if column.name.eq_ignore_ascii_case("created_at") {
                ColumnRole::CreationTimestamp
            } else if column.name.eq_ignore_ascii_case("updated_at") {
                ColumnRole::UpdateTimestamp
            } else {
                ColumnRole::Ordinary
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Table {
        let mut table = Table::new("", "users")
            .with_column(Column::new("id", "uuid"))
            .with_column(Column::new("email", "text"))
            .with_column(Column::new("created_at", "timestamptz"))
            .with_column(Column::new("updated_at", "timestamptz"));
        table.set_primary_key(vec!["id".to_string()], None);
        table.refresh_roles();
        table
    }

    #[test]
    fn test_roles() {
        let table = users();
        let roles: Vec<_> = table.columns.iter().map(|c| c.role).collect();
        assert_eq!(
            roles,
            vec![
                ColumnRole::Identity,
                ColumnRole::Ordinary,
                ColumnRole::CreationTimestamp,
                ColumnRole::UpdateTimestamp
            ]
        );
    }

    #[test]
    fn test_primary_key_forces_not_null() {
        let table = users();
        assert_eq!(table.primary_key_column_name(), Some("id"));
        assert!(!table.column("id").unwrap().is_nullable);
        assert!(table.column("email").unwrap().is_nullable);
    }

    #[test]
    fn test_composite_key_has_no_single_column() {
        let mut table = users();
        table.set_primary_key(vec!["id".to_string(), "email".to_string()], None);
        assert!(table.has_composite_key());
        assert_eq!(table.primary_key_column_name(), None);
    }

    #[test]
    fn test_rename_and_remove_track_primary_key() {
        let mut table = users();
        assert!(table.rename_column("id", "user_id"));
        assert_eq!(table.primary_key, vec!["user_id".to_string()]);
        assert!(!table.rename_column("missing", "x"));

        assert!(table.remove_column("user_id").is_some());
        assert!(table.primary_key.is_empty());
        assert!(table.remove_column("user_id").is_none());
    }

    #[test]
    fn test_table_name_display() {
        assert_eq!(TableName::unqualified("users").to_string(), "users");
        assert_eq!(TableName::new("audit", "events").to_string(), "audit.events");
    }
}
