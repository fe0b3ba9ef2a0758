//! The "build schema for table X" entry point.

use crate::catalog::{Catalog, TableName};
use crate::config::SchemaConfig;
use crate::error::Result;
use crate::migration::discover;
use crate::replay::{validate_primary_key_datatype, ReplayReport, Replayer};
use crate::resolve::{resolve_table, ResolvedTable};
use tablewright_lang::ObjectName;
use tracing::{info, instrument};

/// Reconstructs schemas from migration files.
///
/// Every call discovers and replays the migrations from scratch into a
/// private catalog; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    config: SchemaConfig,
}

impl SchemaBuilder {
    /// Create a builder.
    pub fn new(config: SchemaConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Discover and leniently replay every migration.
    pub fn build_catalog(&self) -> Result<ReplayReport> {
        let migrations = discover(&self.config.migration_dirs)?;
        let report = Replayer::new(self.config.dialect).replay_lenient(&migrations);
        info!(
            dialect = %self.config.dialect,
            migrations = migrations.len(),
            applied = report.statements_applied,
            skipped = report.statements_skipped,
            tables = report.catalog.len(),
            poisoned = report.poisoned.len(),
            "Replayed migrations"
        );
        Ok(report)
    }

    /// Build the resolved schema of one table.
    ///
    /// Fails with the replay error if a statement affecting the table failed,
    /// with `NotFound` if the table does not exist after replay, and with a
    /// primary-key error if validation is enabled and the key is unusable.
    #[instrument(skip(self))]
    pub fn build_table(&self, schema: &str, name: &str) -> Result<ResolvedTable> {
        let report = self.build_catalog()?;

        let requested = Catalog::resolve(&ObjectName::qualified(schema, name));
        let folded = TableName::new(requested.schema.clone(), requested.name.to_lowercase());
        if let Some(error) = report.poison(&requested).or_else(|| report.poison(&folded)) {
            return Err(error.clone().into());
        }

        let table = report.catalog.get_table(schema, name)?;
        if self.config.validate_primary_key {
            validate_primary_key_datatype(table, self.config.dialect, self.config.identity)?;
        }

        let resolved = resolve_table(table, self.config.dialect.mapper());
        info!(
            table = %table.table_name(),
            fields = resolved.fields.len(),
            imports = resolved.imports.len(),
            "Built table schema"
        );
        Ok(resolved)
    }
}
