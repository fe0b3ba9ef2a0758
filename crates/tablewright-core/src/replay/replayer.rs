//! Replays ordered migrations into a fresh catalog.

use super::applier::{DdlApplier, Outcome};
use super::error::ApplyError;
use crate::catalog::{Catalog, TableName};
use crate::dialect::Dialect;
use crate::migration::Migration;
use std::collections::BTreeMap;
use tablewright_lang::{DdlKind, Statement};
use tracing::{debug, warn};

/// Result of a lenient replay.
#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    /// The reconstructed catalog, without poisoned tables.
    pub catalog: Catalog,
    /// Tables whose replay failed, with the first error for each.
    pub poisoned: BTreeMap<TableName, ApplyError>,
    /// Statements that changed the catalog.
    pub statements_applied: usize,
    /// Non-table statements, no-ops and statements on poisoned tables.
    pub statements_skipped: usize,
}

impl ReplayReport {
    /// The replay error recorded for `table`, if any.
    pub fn poison(&self, table: &TableName) -> Option<&ApplyError> {
        self.poisoned.get(table)
    }

    /// Whether every statement replayed cleanly.
    pub fn is_clean(&self) -> bool {
        self.poisoned.is_empty()
    }
}

/// Drives a [`DdlApplier`] over migrations in order.
#[derive(Debug, Clone, Copy)]
pub struct Replayer {
    applier: DdlApplier,
}

impl Replayer {
    /// Create a replayer for `dialect`.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            applier: DdlApplier::new(dialect),
        }
    }

    /// Replay every statement, stopping at the first error.
    pub fn replay_all(&self, migrations: &[Migration]) -> Result<Catalog, ApplyError> {
        let mut catalog = Catalog::new();
        for migration in migrations {
            for statement in &migration.statements {
                self.applier.apply(&mut catalog, statement, &migration.path)?;
            }
        }
        Ok(catalog)
    }

    /// Replay every statement, confining each error to the table it targets.
    ///
    /// A failing statement poisons its table: the table is removed from the
    /// catalog and later statements on it are skipped until a CREATE TABLE
    /// for the same name succeeds. A DROP TABLE naming a poisoned table
    /// drops it, which clears the poison.
    pub fn replay_lenient(&self, migrations: &[Migration]) -> ReplayReport {
        let mut report = ReplayReport::default();

        for migration in migrations {
            for statement in &migration.statements {
                let Some(classification) = tablewright_lang::classify(&statement.sql) else {
                    report.statements_skipped += 1;
                    continue;
                };
                let target = Catalog::resolve(&classification.table);
                let creates = classification.kind == DdlKind::CreateTable;
                let settled: Vec<TableName> = if classification.kind == DdlKind::DropTable {
                    drop_targets(&statement.sql)
                        .into_iter()
                        .filter(|name| report.poisoned.contains_key(name))
                        .collect()
                } else {
                    Vec::new()
                };

                if !creates
                    && classification.kind != DdlKind::DropTable
                    && report.poisoned.contains_key(&target)
                {
                    debug!(
                        file = migration.file_name(),
                        line = statement.line,
                        table = %target,
                        "Skipping statement on poisoned table"
                    );
                    report.statements_skipped += 1;
                    continue;
                }

                match self.applier.apply_with_removed(
                    &mut report.catalog,
                    statement,
                    &migration.path,
                    &classification,
                    &settled,
                ) {
                    Ok(Outcome::Applied) => {
                        report.statements_applied += 1;
                        if creates && report.poisoned.remove(&target).is_some() {
                            debug!(table = %target, "Table recreated, clearing poison");
                        }
                        for name in &settled {
                            report.poisoned.remove(name);
                            debug!(table = %name, "Poisoned table dropped, clearing poison");
                        }
                    }
                    Ok(Outcome::Skipped) => report.statements_skipped += 1,
                    Err(error) => {
                        let table = error.table.clone();
                        warn!(
                            table = %table,
                            error = %error,
                            "Poisoning table after failed statement"
                        );
                        report.catalog.remove(&table);
                        report.poisoned.entry(table).or_insert(error);
                    }
                }
            }
        }
        report
    }
}

/// Tables named by a DROP TABLE statement; empty if it does not parse.
fn drop_targets(sql: &str) -> Vec<TableName> {
    match tablewright_lang::parse(sql) {
        Ok(Statement::DropTable(drop)) => drop
            .names
            .iter()
            .map(|name| Catalog::resolve(&name.value))
            .collect(),
        _ => Vec::new(),
    }
}
