//! Cross-dialect type mapping.
//!
//! A [`DialectTypeMapper`] turns a normalized SQL type plus nullability into a
//! [`TypeMapping`] (the Go field type, the driver wire type and the imports
//! both need) and generates the conversion expressions between the two.
//!
//! Mapping is table-driven. Each dialect registers its canonical scalar types,
//! which carry a nullable wrapper, and its opaque types (byte slices and raw
//! JSON), which carry NULL as a nil slice. Anything else maps to the `any`
//! placeholder.

mod normalize;
mod postgres;
mod sqlite;

pub use normalize::{array_element, normalize};
pub use postgres::PostgresTypeMapper;
pub use sqlite::SqliteTypeMapper;

use crate::dialect::Dialect;
use serde::Serialize;

/// Field type used when a SQL type has no mapping.
pub const PLACEHOLDER_TYPE: &str = "any";

pub(crate) const UUID_IMPORT: &str = "github.com/google/uuid";
pub(crate) const TIME_IMPORT: &str = "time";
pub(crate) const JSON_IMPORT: &str = "encoding/json";

/// The target-language representation of one column type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMapping {
    /// Type of the struct field, e.g. `int32`, `uuid.UUID`.
    pub field_type: String,
    /// Type the driver scans into and binds from, e.g. `pgtype.Int4`.
    pub wire_type: String,
    /// Import paths: the field type's first, then the wire type's.
    pub imports: Vec<&'static str>,
    /// Whether the wire type is a nullable wrapper with a `Valid` flag.
    pub nullable_wrapper: bool,
}

impl TypeMapping {
    /// Mapping for a type with no registered representation.
    pub fn placeholder() -> Self {
        Self {
            field_type: PLACEHOLDER_TYPE.to_string(),
            wire_type: PLACEHOLDER_TYPE.to_string(),
            imports: Vec::new(),
            nullable_wrapper: false,
        }
    }

    /// Whether this is the placeholder mapping.
    pub fn is_placeholder(&self) -> bool {
        self.field_type == PLACEHOLDER_TYPE
    }

    /// Whether the field type is a slice (arrays and opaque byte types).
    pub fn is_slice(&self) -> bool {
        self.field_type.starts_with("[]")
    }
}

/// A generated wire-to-field conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadExpr {
    /// The expression.
    pub code: String,
    /// Whether the expression returns `(value, error)`.
    pub fallible: bool,
}

impl ReadExpr {
    pub(crate) fn infallible(code: String) -> Self {
        Self {
            code,
            fallible: false,
        }
    }
}

/// Registry entry for a wrapper-bearing scalar type.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScalarType {
    /// Go field type.
    pub field: &'static str,
    /// Wire type for NOT NULL columns.
    pub wire: &'static str,
    /// Wire type for nullable columns.
    pub nullable_wire: &'static str,
    /// Accessor of the value inside the nullable wrapper.
    pub accessor: &'static str,
    pub field_import: Option<&'static str>,
    pub wire_import: Option<&'static str>,
    pub nullable_import: &'static str,
}

impl ScalarType {
    pub(crate) fn mapping(&self, nullable: bool) -> TypeMapping {
        let wire = if nullable { self.nullable_wire } else { self.wire };
        let wire_import = if nullable {
            Some(self.nullable_import)
        } else {
            self.wire_import
        };
        TypeMapping {
            field_type: self.field.to_string(),
            wire_type: wire.to_string(),
            imports: imports([self.field_import, wire_import]),
            nullable_wrapper: nullable,
        }
    }
}

/// Registry entry for an opaque type.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpaqueType {
    pub field: &'static str,
    pub import: Option<&'static str>,
}

impl OpaqueType {
    pub(crate) fn mapping(&self) -> TypeMapping {
        TypeMapping {
            field_type: self.field.to_string(),
            wire_type: self.field.to_string(),
            imports: imports([self.import, None]),
            nullable_wrapper: false,
        }
    }
}

/// Ordered, de-duplicated import list.
fn imports(paths: [Option<&'static str>; 2]) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::with_capacity(2);
    for path in paths.into_iter().flatten() {
        if !out.contains(&path) {
            out.push(path);
        }
    }
    out
}

/// Maps normalized SQL types to target-language types for one dialect.
///
/// Implementations are stateless and selected once per run through
/// [`Dialect::mapper`].
pub trait DialectTypeMapper: Send + Sync {
    /// The dialect this mapper serves.
    fn dialect(&self) -> Dialect;

    /// Map a normalized type (see [`normalize`]) to its representation.
    /// Unknown types map to [`TypeMapping::placeholder`].
    fn map_type(&self, normalized: &str, nullable: bool) -> TypeMapping;

    /// Convert the wire value `source` into a field value.
    fn read_expr(&self, mapping: &TypeMapping, source: &str) -> ReadExpr;

    /// Convert the field value `value` into a wire value.
    fn write_expr(&self, mapping: &TypeMapping, value: &str) -> String;

    /// Canonical scalar types that carry a nullable wrapper.
    fn canonical_types(&self) -> &'static [&'static str];

    /// Opaque types that map to slices and carry NULL as nil.
    fn opaque_types(&self) -> &'static [&'static str];

    /// Boolean expression that is true when `value` holds a non-zero value.
    ///
    /// Wrappers check `Valid`; plain strings, numbers, UUIDs and times
    /// compare against their zero value; everything else is always `true`.
    fn zero_check(&self, mapping: &TypeMapping, value: &str) -> String {
        if mapping.nullable_wrapper {
            return format!("{}.Valid", value);
        }
        match mapping.field_type.as_str() {
            "string" => format!("{} != \"\"", value),
            "int16" | "int32" | "int64" | "float32" | "float64" => format!("{} != 0", value),
            "uuid.UUID" => format!("{} != uuid.Nil", value),
            "time.Time" => format!("!{}.IsZero()", value),
            _ => "true".to_string(),
        }
    }

    /// Map the raw declared type of a column.
    fn map_column_type(&self, raw: &str, nullable: bool) -> TypeMapping {
        self.map_type(&normalize(raw), nullable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mappers() -> [&'static dyn DialectTypeMapper; 2] {
        [&PostgresTypeMapper, &SqliteTypeMapper]
    }

    #[test]
    fn test_canonical_types_round_trip() {
        for mapper in mappers() {
            for ty in mapper.canonical_types() {
                let plain = mapper.map_type(ty, false);
                let nullable = mapper.map_type(ty, true);
                assert!(!plain.field_type.is_empty(), "{} {}", mapper.dialect(), ty);
                assert!(!plain.is_placeholder(), "{} {}", mapper.dialect(), ty);
                assert_eq!(plain.field_type, nullable.field_type);
                assert_ne!(plain.wire_type, nullable.wire_type, "{} {}", mapper.dialect(), ty);
                assert!(nullable.nullable_wrapper);
                assert!(!plain.nullable_wrapper);
            }
        }
    }

    #[test]
    fn test_opaque_types_have_no_wrapper() {
        for mapper in mappers() {
            for ty in mapper.opaque_types() {
                let plain = mapper.map_type(ty, false);
                let nullable = mapper.map_type(ty, true);
                assert_eq!(plain, nullable);
                assert!(!nullable.nullable_wrapper);
                assert_eq!(mapper.zero_check(&nullable, "v"), "true");
            }
        }
    }

    #[test]
    fn test_canonical_and_opaque_are_disjoint() {
        for mapper in mappers() {
            for ty in mapper.opaque_types() {
                assert!(!mapper.canonical_types().contains(ty));
            }
        }
    }

    #[test]
    fn test_unknown_type_is_placeholder() {
        for mapper in mappers() {
            let mapping = mapper.map_type("geometry", true);
            assert_eq!(mapping, TypeMapping::placeholder());
            assert_eq!(mapper.zero_check(&mapping, "v"), "true");
            assert_eq!(mapper.read_expr(&mapping, "v").code, "v");
            assert_eq!(mapper.write_expr(&mapping, "v"), "v");
        }
    }

    #[test]
    fn test_zero_checks() {
        let pg = PostgresTypeMapper;
        let check = |ty: &str, nullable: bool| pg.zero_check(&pg.map_type(ty, nullable), "m.X");
        assert_eq!(check("integer", true), "m.X.Valid");
        assert_eq!(check("integer", false), "m.X != 0");
        assert_eq!(check("double precision", false), "m.X != 0");
        assert_eq!(check("text", false), "m.X != \"\"");
        assert_eq!(check("uuid", false), "m.X != uuid.Nil");
        assert_eq!(check("timestamptz", false), "!m.X.IsZero()");
        assert_eq!(check("boolean", false), "true");
        assert_eq!(check("integer[]", true), "true");
    }

    #[test]
    fn test_imports_are_deduplicated() {
        assert_eq!(imports([Some("time"), Some("time")]), vec!["time"]);
        assert_eq!(imports([None, Some("database/sql")]), vec!["database/sql"]);
    }
}
