//! Column definitions.

use serde::Serialize;

/// Semantic role of a column, assigned whenever a table's shape changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Primary-key column.
    Identity,
    /// `created_at`: set once by the database or the repository layer.
    CreationTimestamp,
    /// `updated_at`: maintained on every write.
    UpdateTimestamp,
    /// Everything else.
    Ordinary,
}

impl ColumnRole {
    /// Whether generated code must never write this column.
    pub fn is_timestamp(&self) -> bool {
        matches!(
            self,
            ColumnRole::CreationTimestamp | ColumnRole::UpdateTimestamp
        )
    }
}

/// A foreign key from a column to another table's column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    /// Referenced table, schema-qualified when not in the default schema.
    pub referenced_table: String,
    /// Referenced column.
    pub referenced_column: String,
    /// Name given with `CONSTRAINT name`, if any.
    pub constraint_name: Option<String>,
}

/// A column of a reconstructed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Column name (unique within its table).
    pub name: String,
    /// Data type exactly as last declared, e.g. `varchar(255)`.
    pub data_type: String,
    /// Whether NULL is allowed.
    pub is_nullable: bool,
    /// Whether the column is part of the primary key.
    pub is_primary_key: bool,
    /// Foreign key, if the column references another table.
    pub foreign_key: Option<ForeignKey>,
    /// Raw default expression.
    pub default: Option<String>,
    /// Whether a single-column UNIQUE constraint covers the column.
    pub is_unique: bool,
    /// Semantic role.
    pub role: ColumnRole,
}

impl Column {
    /// Create a nullable column with no constraints.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            is_primary_key: false,
            foreign_key: None,
            default: None,
            is_unique: false,
            role: ColumnRole::Ordinary,
        }
    }

    /// Mark the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    /// Set the default expression.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the foreign key.
    pub fn with_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_key = Some(foreign_key);
        self
    }

    /// The data type in canonical form, e.g. `varchar(255)` becomes `varchar`.
    pub fn normalized_type(&self) -> String {
        crate::typemap::normalize(&self.data_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_column_is_nullable() {
        let col = Column::new("bio", "text");
        assert!(col.is_nullable);
        assert!(!col.is_primary_key);
        assert_eq!(col.role, ColumnRole::Ordinary);
        assert!(!Column::new("bio", "text").not_null().is_nullable);
    }

    #[test]
    fn test_normalized_type() {
        let col = Column::new("name", "CHARACTER VARYING(255)");
        assert_eq!(col.normalized_type(), "varchar");
    }

    #[test]
    fn test_timestamp_roles() {
        assert!(ColumnRole::CreationTimestamp.is_timestamp());
        assert!(ColumnRole::UpdateTimestamp.is_timestamp());
        assert!(!ColumnRole::Identity.is_timestamp());
    }
}
