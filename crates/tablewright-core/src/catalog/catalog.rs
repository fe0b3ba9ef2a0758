//! The in-memory schema catalog built by replay.

use super::table::{Table, TableName};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use tablewright_lang::ObjectName;
use thiserror::Error;

/// Schema qualifiers that mean "the default schema".
const DEFAULT_SCHEMA_ALIASES: &[&str] = &["public", "main"];

/// No CREATE TABLE was observed for the requested table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("table {table} not found in migrations")]
pub struct NotFoundError {
    /// The table that was looked up.
    pub table: TableName,
}

/// Mutable accumulator of tables for one build.
///
/// Tables are kept in a `BTreeMap` so that iteration order, and therefore
/// anything derived from the catalog, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tables: BTreeMap<TableName, Table>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a schema qualifier into the catalog's keying convention.
    pub fn fold_schema(schema: Option<&str>) -> String {
        match schema {
            None => String::new(),
            Some(s) if DEFAULT_SCHEMA_ALIASES.iter().any(|a| s.eq_ignore_ascii_case(a)) => {
                String::new()
            }
            Some(s) => s.to_string(),
        }
    }

    /// Resolve a parsed object name to a catalog key.
    pub fn resolve(name: &ObjectName) -> TableName {
        TableName::new(Self::fold_schema(name.schema.as_deref()), name.name.clone())
    }

    /// Look up a table.
    ///
    /// `schema` may be empty, `public` or `main` for the default schema. An
    /// exact name match wins; otherwise the lower-cased name is tried, since
    /// unquoted identifiers are stored folded.
    pub fn get_table(&self, schema: &str, name: &str) -> Result<&Table, NotFoundError> {
        let schema = Self::fold_schema(Some(schema));
        let exact = TableName::new(schema.clone(), name);
        if let Some(table) = self.tables.get(&exact) {
            return Ok(table);
        }
        let folded = TableName::new(schema, name.to_lowercase());
        self.tables
            .get(&folded)
            .ok_or(NotFoundError { table: exact })
    }

    /// Get a table by resolved name.
    pub fn table(&self, name: &TableName) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Check whether a table exists.
    pub fn contains(&self, name: &TableName) -> bool {
        self.tables.contains_key(name)
    }

    /// Insert a table, replacing any table with the same name.
    pub fn insert(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.table_name(), table)
    }

    /// Remove a table.
    pub fn remove(&mut self, name: &TableName) -> Option<Table> {
        self.tables.remove(name)
    }

    /// Point every foreign key that references `from` at `to`.
    pub fn retarget_references(&mut self, from: &TableName, to: &TableName) {
        let from = from.to_string();
        let to = to.to_string();
        for table in self.tables.values_mut() {
            for column in &mut table.columns {
                if let Some(fk) = column.foreign_key.as_mut() {
                    if fk.referenced_table == from {
                        fk.referenced_table = to.clone();
                    }
                }
            }
        }
    }

    /// Follow a column rename in every foreign key that references it.
    pub fn rename_referenced_column(&mut self, table: &TableName, from: &str, to: &str) {
        let table = table.to_string();
        for column in self.tables.values_mut().flat_map(|t| t.columns.iter_mut()) {
            if let Some(fk) = column.foreign_key.as_mut() {
                if fk.referenced_table == table && fk.referenced_column == from {
                    fk.referenced_column = to.to_string();
                }
            }
        }
    }

    /// All tables, ordered by schema then name.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// All table names, ordered by schema then name.
    pub fn table_names(&self) -> impl Iterator<Item = &TableName> {
        self.tables.keys()
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if the catalog has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Serialize the catalog as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.tables.values())
    }
}
