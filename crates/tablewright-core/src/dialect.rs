//! Target SQL dialects.

use crate::typemap::{DialectTypeMapper, PostgresTypeMapper, SqliteTypeMapper};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static POSTGRES: PostgresTypeMapper = PostgresTypeMapper;
static SQLITE: SqliteTypeMapper = SqliteTypeMapper;

/// SQL dialect of the migrations and of the generated driver code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL with pgx.
    #[default]
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    /// SQLite with `database/sql`.
    #[serde(alias = "sqlite3")]
    Sqlite,
}

impl Dialect {
    /// The type mapper for this dialect.
    pub fn mapper(self) -> &'static dyn DialectTypeMapper {
        match self {
            Dialect::Postgres => &POSTGRES,
            Dialect::Sqlite => &SQLITE,
        }
    }

    /// Whether `ALTER TABLE ... ALTER COLUMN` is part of the dialect.
    pub fn supports_alter_column(self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized dialect name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dialect '{0}' (expected postgres or sqlite)")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("PostgreSQL".parse::<Dialect>(), Ok(Dialect::Postgres));
        assert_eq!("pg".parse::<Dialect>(), Ok(Dialect::Postgres));
        assert_eq!("sqlite3".parse::<Dialect>(), Ok(Dialect::Sqlite));
        let err = "mysql".parse::<Dialect>().unwrap_err();
        assert_eq!(err.to_string(), "unknown dialect 'mysql' (expected postgres or sqlite)");
    }

    #[test]
    fn test_mapper_matches_dialect() {
        for dialect in [Dialect::Postgres, Dialect::Sqlite] {
            assert_eq!(dialect.mapper().dialect(), dialect);
            assert_eq!(dialect.to_string().parse::<Dialect>(), Ok(dialect));
        }
    }

    #[test]
    fn test_serde_aliases() {
        let d: Dialect = serde_json::from_str("\"postgresql\"").unwrap();
        assert_eq!(d, Dialect::Postgres);
        let d: Dialect = serde_json::from_str("\"sqlite\"").unwrap();
        assert_eq!(d, Dialect::Sqlite);
        assert_eq!(serde_json::to_string(&Dialect::Sqlite).unwrap(), "\"sqlite\"");
    }
}
