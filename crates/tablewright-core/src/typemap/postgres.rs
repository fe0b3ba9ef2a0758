//! PostgreSQL type mapping (pgx `pgtype` wrappers).

use super::{
    array_element, DialectTypeMapper, OpaqueType, ReadExpr, ScalarType, TypeMapping, JSON_IMPORT,
    TIME_IMPORT, UUID_IMPORT,
};
use crate::dialect::Dialect;

const PGTYPE_IMPORT: &str = "github.com/jackc/pgx/v5/pgtype";

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
        nullable_import: PGTYPE_IMPORT,
    }
}

const INT2: ScalarType = scalar("int16", "pgtype.Int2", "Int16", None);
const INT4: ScalarType = scalar("int32", "pgtype.Int4", "Int32", None);
const INT8: ScalarType = scalar("int64", "pgtype.Int8", "Int64", None);
const FLOAT4: ScalarType = scalar("float32", "pgtype.Float4", "Float32", None);
const FLOAT8: ScalarType = scalar("float64", "pgtype.Float8", "Float64", None);
const BOOL: ScalarType = scalar("bool", "pgtype.Bool", "Bool", None);
const TEXT: ScalarType = scalar("string", "pgtype.Text", "String", None);
const UUID: ScalarType = scalar("uuid.UUID", "pgtype.UUID", "Bytes", Some(UUID_IMPORT));
const TIMESTAMPTZ: ScalarType =
    scalar("time.Time", "pgtype.Timestamptz", "Time", Some(TIME_IMPORT));
const TIMESTAMP: ScalarType = scalar("time.Time", "pgtype.Timestamp", "Time", Some(TIME_IMPORT));
const DATE: ScalarType = scalar("time.Time", "pgtype.Date", "Time", Some(TIME_IMPORT));

const CANONICAL: &[&str] = &[
    "smallint",
    "integer",
    "bigint",
    "smallserial",
    "serial",
    "bigserial",
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

const OPAQUE: &[&str] = &["bytea", "json", "jsonb"];

/// Type mapper for PostgreSQL via pgx.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresTypeMapper;

impl PostgresTypeMapper {
    fn scalar(normalized: &str) -> Option<ScalarType> {
        let ty = match normalized {
            "smallint" | "smallserial" => INT2,
            "integer" | "serial" => INT4,
            "bigint" | "bigserial" => INT8,
            "real" => FLOAT4,
            "double precision" | "numeric" => FLOAT8,
            "boolean" => BOOL,
            "varchar" | "char" | "text" => TEXT,
            "uuid" => UUID,
            "timestamptz" => TIMESTAMPTZ,
            "timestamp" => TIMESTAMP,
            "date" => DATE,
            _ => return None,
        };
        Some(ty)
    }

    fn opaque(normalized: &str) -> Option<OpaqueType> {
        match normalized {
            "bytea" => Some(OpaqueType {
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

    /// The registry entry behind a nullable wrapper type.
    fn wrapper(wire_type: &str) -> Option<ScalarType> {
        [
            INT2,
            INT4,
            INT8,
            FLOAT4,
            FLOAT8,
            BOOL,
            TEXT,
            UUID,
            TIMESTAMPTZ,
            TIMESTAMP,
            DATE,
        ]
        .into_iter()
        .find(|s| s.nullable_wire == wire_type)
    }
}

impl DialectTypeMapper for PostgresTypeMapper {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn map_type(&self, normalized: &str, nullable: bool) -> TypeMapping {
        if let Some(element) = array_element(normalized) {
            // Arrays are never wrapped; NULL is a nil slice.
            return match Self::scalar(element) {
                Some(scalar) => {
                    let inner = scalar.mapping(false);
                    let slice = format!("[]{}", inner.field_type);
                    TypeMapping {
                        field_type: slice.clone(),
                        wire_type: slice,
                        imports: inner.imports,
                        nullable_wrapper: false,
                    }
                }
                None => TypeMapping::placeholder(),
            };
        }
        if let Some(scalar) = Self::scalar(normalized) {
            return scalar.mapping(nullable);
        }
        if let Some(opaque) = Self::opaque(normalized) {
            return opaque.mapping();
        }
        TypeMapping::placeholder()
    }

    fn read_expr(&self, mapping: &TypeMapping, source: &str) -> ReadExpr {
        if !mapping.nullable_wrapper {
            return ReadExpr::infallible(source.to_string());
        }
        let code = match Self::wrapper(&mapping.wire_type) {
            Some(s) if s.accessor == "Bytes" => format!("uuid.UUID({}.Bytes)", source),
            Some(s) => format!("{}.{}", source, s.accessor),
            None => source.to_string(),
        };
        ReadExpr::infallible(code)
    }

    fn write_expr(&self, mapping: &TypeMapping, value: &str) -> String {
        if !mapping.nullable_wrapper {
            return value.to_string();
        }
        match Self::wrapper(&mapping.wire_type) {
            Some(s) => format!("{}{{{}: {}, Valid: true}}", s.nullable_wire, s.accessor, value),
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

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integer_mappings() {
        let pg = PostgresTypeMapper;
        let plain = pg.map_type("integer", false);
        assert_eq!(plain.field_type, "int32");
        assert_eq!(plain.wire_type, "int32");
        assert!(plain.imports.is_empty());

        let nullable = pg.map_type("integer", true);
        assert_eq!(nullable.field_type, "int32");
        assert_eq!(nullable.wire_type, "pgtype.Int4");
        assert_eq!(nullable.imports, vec![PGTYPE_IMPORT]);
        assert!(nullable.nullable_wrapper);

        assert_eq!(pg.map_type("bigserial", true).wire_type, "pgtype.Int8");
        assert_eq!(pg.map_type("smallint", false).field_type, "int16");
    }

    #[test]
    fn test_uuid_mapping() {
        let pg = PostgresTypeMapper;
        let plain = pg.map_type("uuid", false);
        assert_eq!(plain.field_type, "uuid.UUID");
        assert_eq!(plain.imports, vec![UUID_IMPORT]);
        assert_eq!(pg.read_expr(&plain, "row.ID").code, "row.ID");

        let nullable = pg.map_type("uuid", true);
        assert_eq!(nullable.wire_type, "pgtype.UUID");
        assert_eq!(nullable.imports, vec![UUID_IMPORT, PGTYPE_IMPORT]);
        assert_eq!(
            pg.read_expr(&nullable, "row.OwnerID"),
            ReadExpr {
                code: "uuid.UUID(row.OwnerID.Bytes)".to_string(),
                fallible: false
            }
        );
        assert_eq!(
            pg.write_expr(&nullable, "m.OwnerID"),
            "pgtype.UUID{Bytes: m.OwnerID, Valid: true}"
        );
    }

    #[test]
    fn test_wrapper_read_write() {
        let pg = PostgresTypeMapper;
        let age = pg.map_type("integer", true);
        assert_eq!(pg.read_expr(&age, "row.Age").code, "row.Age.Int32");
        assert_eq!(pg.write_expr(&age, "m.Age"), "pgtype.Int4{Int32: m.Age, Valid: true}");

        let seen = pg.map_type("timestamptz", true);
        assert_eq!(seen.imports, vec![TIME_IMPORT, PGTYPE_IMPORT]);
        assert_eq!(pg.read_expr(&seen, "row.SeenAt").code, "row.SeenAt.Time");

        let name = pg.map_type("text", false);
        assert_eq!(pg.write_expr(&name, "m.Name"), "m.Name");
    }

    #[test]
    fn test_arrays_are_slices() {
        let pg = PostgresTypeMapper;
        let tags = pg.map_type("text[]", true);
        assert_eq!(tags.field_type, "[]string");
        assert_eq!(tags.wire_type, "[]string");
        assert!(!tags.nullable_wrapper);

        let ids = pg.map_type("uuid[]", false);
        assert_eq!(ids.field_type, "[]uuid.UUID");
        assert_eq!(ids.imports, vec![UUID_IMPORT]);

        assert!(pg.map_type("geometry[]", false).is_placeholder());
    }

    #[test]
    fn test_opaque_types() {
        let pg = PostgresTypeMapper;
        assert_eq!(pg.map_type("bytea", true).field_type, "[]byte");
        let doc = pg.map_type("jsonb", true);
        assert_eq!(doc.field_type, "json.RawMessage");
        assert_eq!(doc.imports, vec![JSON_IMPORT]);
        assert!(pg.map_type("blob", false).is_placeholder());
    }
}
