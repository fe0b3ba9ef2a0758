//! Build configuration.

use crate::dialect::Dialect;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default migration directory, relative to the project root.
pub const DEFAULT_MIGRATION_DIR: &str = "migrations";

/// Which primary-key types are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityPolicy {
    /// The dialect's UUID convention (`uuid`; SQLite also accepts `text`).
    #[default]
    Uuid,
    /// Any single-column primary key.
    Any,
}

/// Configuration for one schema build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Dialect of the migrations.
    pub dialect: Dialect,

    /// Directories scanned for `*.sql` files, in tie-break order.
    pub migration_dirs: Vec<PathBuf>,

    /// Accepted primary-key types.
    pub identity: IdentityPolicy,

    /// Whether to check the primary key after replay.
    pub validate_primary_key: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            migration_dirs: vec![PathBuf::from(DEFAULT_MIGRATION_DIR)],
            identity: IdentityPolicy::default(),
            validate_primary_key: true,
        }
    }
}

impl SchemaConfig {
    /// Create a configuration for `dialect` reading from `migration_dir`.
    pub fn new(dialect: Dialect, migration_dir: impl Into<PathBuf>) -> Self {
        Self {
            dialect,
            migration_dirs: vec![migration_dir.into()],
            ..Self::default()
        }
    }

    /// Set the dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Add another migration directory.
    pub fn with_migration_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migration_dirs.push(dir.into());
        self
    }

    /// Set the identity policy.
    pub fn with_identity(mut self, identity: IdentityPolicy) -> Self {
        self.identity = identity;
        self
    }

    /// Skip primary-key validation.
    pub fn without_primary_key_validation(mut self) -> Self {
        self.validate_primary_key = false;
        self
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
