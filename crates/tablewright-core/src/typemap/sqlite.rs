//! SQLite type mapping (`database/sql` null wrappers).

use super::{
    DialectTypeMapper, OpaqueType, ReadExpr, ScalarType, TypeMapping, JSON_IMPORT, TIME_IMPORT,
    UUID_IMPORT,
};
use crate::dialect::Dialect;

const SQL_IMPORT: &str = "database/sql";

const fn scalar(
    field: &'static str,
    nullable_wire: &'static str,
    accessor: &'static str,
    field_import: Option<&'static str>,
) -> ScalarType {
    ScalarType {
        field,
        wire: field,
        nullable_wire,
        accessor,
        field_import,
        wire_import: field_import,
        nullable_import: SQL_IMPORT,
    }
}

const INTEGER: ScalarType = scalar("int64", "sql.NullInt64", "Int64", None);
const FLOAT: ScalarType = scalar("float64", "sql.NullFloat64", "Float64", None);
const BOOL: ScalarType = scalar("bool", "sql.NullBool", "Bool", None);
const TEXT: ScalarType = scalar("string", "sql.NullString", "String", None);
const TIME: ScalarType = scalar("time.Time", "sql.NullTime", "Time", Some(TIME_IMPORT));

// UUIDs travel as text and are parsed on read.
const UUID: ScalarType = ScalarType {
    field: "uuid.UUID",
    wire: "string",
    nullable_wire: "sql.NullString",
    accessor: "String",
    field_import: Some(UUID_IMPORT),
    wire_import: None,
    nullable_import: SQL_IMPORT,
};

const CANONICAL: &[&str] = &[
    "smallint",
    "integer",
    "bigint",
    "real",
    "double precision",
    "numeric",
    "boolean",
    "varchar",
    "char",
    "text",
    "timestamptz",
    "timestamp",
    "date",
    "uuid",
];

const OPAQUE: &[&str] = &["blob", "json", "jsonb"];

/// Type mapper for SQLite via `database/sql`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteTypeMapper;

impl SqliteTypeMapper {
    fn scalar(normalized: &str) -> Option<ScalarType> {
        let ty = match normalized {
            "smallint" | "integer" | "bigint" => INTEGER,
            "real" | "double precision" | "numeric" => FLOAT,
            "boolean" => BOOL,
            "varchar" | "char" | "text" => TEXT,
            "timestamptz" | "timestamp" | "date" => TIME,
            "uuid" => UUID,
            _ => return None,
        };
        Some(ty)
    }

    fn opaque(normalized: &str) -> Option<OpaqueType> {
        match normalized {
            "blob" => Some(OpaqueType {
                field: "[]byte",
                import: None,
            }),
            "json" | "jsonb" => Some(OpaqueType {
                field: "json.RawMessage",
                import: Some(JSON_IMPORT),
            }),
            _ => None,
        }
    }

    fn is_uuid(mapping: &TypeMapping) -> bool {
        mapping.field_type == UUID.field
    }

    fn accessor(wire_type: &str) -> Option<&'static str> {
        [INTEGER, FLOAT, BOOL, TEXT, TIME]
            .into_iter()
            .find(|s| s.nullable_wire == wire_type)
            .map(|s| s.accessor)
    }
}

impl DialectTypeMapper for SqliteTypeMapper {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn map_type(&self, normalized: &str, nullable: bool) -> TypeMapping {
        if let Some(scalar) = Self::scalar(normalized) {
            return scalar.mapping(nullable);
        }
        if let Some(opaque) = Self::opaque(normalized) {
            return opaque.mapping();
        }
        // No array support; `t[]` falls through as well.
        TypeMapping::placeholder()
    }

    fn read_expr(&self, mapping: &TypeMapping, source: &str) -> ReadExpr {
        if Self::is_uuid(mapping) {
            // A NULL column scans as an empty string, which uuid.Parse rejects.
            let code = if mapping.nullable_wrapper {
                format!(
                    "func() (uuid.UUID, error) {{ if !{src}.Valid {{ return uuid.Nil, nil }}; return uuid.Parse({src}.String) }}()",
                    src = source
                )
            } else {
                format!("uuid.Parse({})", source)
            };
            return ReadExpr {
                code,
                fallible: true,
            };
        }
        if !mapping.nullable_wrapper {
            return ReadExpr::infallible(source.to_string());
        }
        let code = match Self::accessor(&mapping.wire_type) {
            Some(accessor) => format!("{}.{}", source, accessor),
            None => source.to_string(),
        };
        ReadExpr::infallible(code)
    }

    fn write_expr(&self, mapping: &TypeMapping, value: &str) -> String {
        if Self::is_uuid(mapping) {
            return if mapping.nullable_wrapper {
                format!("sql.NullString{{String: {}.String(), Valid: true}}", value)
            } else {
                format!("{}.String()", value)
            };
        }
        if !mapping.nullable_wrapper {
            return value.to_string();
        }
        match Self::accessor(&mapping.wire_type) {
            Some(accessor) => format!(
                "{}{{{}: {}, Valid: true}}",
                mapping.wire_type, accessor, value
            ),
            None => value.to_string(),
        }
    }

    fn canonical_types(&self) -> &'static [&'static str] {
        CANONICAL
    }

    fn opaque_types(&self) -> &'static [&'static str] {
        OPAQUE
    }
}
