//! Field resolution: the hand-off from a reconstructed table to code
//! generation.

use crate::catalog::{Column, ColumnRole, Table};
use crate::typemap::{DialectTypeMapper, ReadExpr, TypeMapping};
use convert_case::{Case, Casing};
use serde::Serialize;
use std::collections::BTreeSet;

/// Variable holding a scanned row in generated code.
pub const ROW_VAR: &str = "row";

/// Variable holding the model in generated code.
pub const MODEL_VAR: &str = "m";

/// Words kept upper-case in Go identifiers.
const INITIALISMS: &[&str] = &["id", "url", "uuid", "api", "http", "json", "ip", "sql"];

/// One column, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedField {
    /// The column as replayed.
    pub column: Column,
    /// Exported Go field name, e.g. `OwnerID`.
    pub go_name: String,
    /// Semantic role.
    pub role: ColumnRole,
    /// Field and wire types.
    pub mapping: TypeMapping,
    /// Wire-to-field conversion of `row.<GoName>`.
    pub read: ReadExpr,
    /// Field-to-wire conversion of `m.<GoName>`; `None` for timestamp
    /// columns, which generated code never writes.
    pub write: Option<String>,
    /// Non-zero check of `m.<GoName>`.
    pub zero_check: String,
}

/// A table, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTable {
    pub schema: String,
    pub name: String,
    /// Exported Go type name.
    pub go_name: String,
    /// Fields in column order.
    pub fields: Vec<ResolvedField>,
    /// Every import the fields need, sorted.
    pub imports: BTreeSet<&'static str>,
}

impl ResolvedTable {
    /// Get a field by column name.
    pub fn field(&self, column: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.column.name == column)
    }

    /// The primary-key field.
    pub fn identity(&self) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.role == ColumnRole::Identity)
    }

    /// Fields that generated code writes.
    pub fn writable_fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter().filter(|f| f.write.is_some())
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Resolve every column of `table` through `mapper`.
pub fn resolve_table(table: &Table, mapper: &dyn DialectTypeMapper) -> ResolvedTable {
    let fields: Vec<ResolvedField> = table
        .columns
        .iter()
        .map(|column| resolve_field(column, mapper))
        .collect();
    let imports = fields
        .iter()
        .flat_map(|f| f.mapping.imports.iter().copied())
        .collect();

    ResolvedTable {
        schema: table.schema.clone(),
        name: table.name.clone(),
        go_name: go_name(&table.name),
        fields,
        imports,
    }
}

/// Resolve one column.
pub fn resolve_field(column: &Column, mapper: &dyn DialectTypeMapper) -> ResolvedField {
    let go_name = go_name(&column.name);
    let mapping = mapper.map_column_type(&column.data_type, column.is_nullable);
    let source = format!("{}.{}", ROW_VAR, go_name);
    let value = format!("{}.{}", MODEL_VAR, go_name);

    let read = mapper.read_expr(&mapping, &source);
    let write = if column.role.is_timestamp() {
        None
    } else {
        Some(mapper.write_expr(&mapping, &value))
    };
    let zero_check = mapper.zero_check(&mapping, &value);

    ResolvedField {
        column: column.clone(),
        go_name,
        role: column.role,
        mapping,
        read,
        write,
        zero_check,
    }
}

/// Exported Go identifier for a SQL name: `owner_id` becomes `OwnerID`.
pub fn go_name(sql_name: &str) -> String {
    sql_name
        .to_case(Case::Snake)
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            if INITIALISMS.contains(&word) {
                word.to_ascii_uppercase()
            } else {
                word.to_case(Case::Pascal)
            }
        })
        .collect()
}
