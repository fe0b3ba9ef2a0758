//! Applies table DDL statements to a [`Catalog`].

use super::error::{ApplyError, ApplyErrorKind};
use crate::catalog::{Catalog, Column, ForeignKey, Table, TableName};
use crate::dialect::Dialect;
use crate::migration::MigrationStatement;
use std::path::Path;
use tablewright_lang::{
    AlterAction, AlterTable, Classification, ColumnChange, ColumnDef, CreateTable, DropTable,
    ObjectName, Statement, TableConstraint, TableSource,
};
use tracing::{debug, warn};

/// Column assumed by `REFERENCES t` when `t` has no single-column key yet.
const DEFAULT_REFERENCED_COLUMN: &str = "id";

/// Whether a statement changed the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The catalog was updated.
    Applied,
    /// Not table DDL, or a no-op such as `CREATE TABLE IF NOT EXISTS` on an
    /// existing table.
    Skipped,
}

/// Replays classified DDL statements into a catalog.
#[derive(Debug, Clone, Copy)]
pub struct DdlApplier {
    dialect: Dialect,
}

/// Location of the statement being applied, for error reporting.
struct Context<'a> {
    path: &'a Path,
    statement: &'a MigrationStatement,
    table: TableName,
    /// Tables that exist in replay order but were taken out of the catalog.
    removed: &'a [TableName],
}

impl Context<'_> {
    fn error(&self, kind: ApplyErrorKind) -> ApplyError {
        self.error_for(self.table.clone(), kind)
    }

    fn error_for(&self, table: TableName, kind: ApplyErrorKind) -> ApplyError {
        ApplyError {
            path: self.path.to_path_buf(),
            line: self.statement.line,
            statement: self.statement.sql.clone(),
            table,
            kind,
        }
    }

    fn was_removed(&self, name: &TableName) -> bool {
        self.removed.contains(name)
    }

    fn unknown_column(&self, table: &Table, column: &str) -> ApplyError {
        self.error(ApplyErrorKind::UnknownColumn {
            table: table.table_name(),
            column: column.to_string(),
        })
    }
}

/// Column renames to propagate to foreign keys once a statement commits.
type ColumnRenames = Vec<(String, String)>;

impl DdlApplier {
    /// Create an applier for `dialect`.
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// The dialect statements are interpreted in.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Classify and apply one statement.
    pub fn apply(
        &self,
        catalog: &mut Catalog,
        statement: &MigrationStatement,
        path: &Path,
    ) -> Result<Outcome, ApplyError> {
        match tablewright_lang::classify(&statement.sql) {
            Some(classification) => {
                self.apply_classified(catalog, statement, path, &classification)
            }
            None => {
                debug!(
                    file = %path.display(),
                    line = statement.line,
                    "Skipping non-table statement"
                );
                Ok(Outcome::Skipped)
            }
        }
    }

    /// Apply a statement that has already been classified.
    ///
    /// The statement is applied atomically: on error the catalog is left as
    /// it was before the call.
    pub fn apply_classified(
        &self,
        catalog: &mut Catalog,
        statement: &MigrationStatement,
        path: &Path,
        classification: &Classification,
    ) -> Result<Outcome, ApplyError> {
        self.apply_with_removed(catalog, statement, path, classification, &[])
    }

    /// Apply a classified statement, treating `removed` tables as existing
    /// even though they are absent from `catalog`.
    ///
    /// `DROP TABLE` accepts such names without `IF EXISTS` and counts them as
    /// dropped.
    pub fn apply_with_removed(
        &self,
        catalog: &mut Catalog,
        statement: &MigrationStatement,
        path: &Path,
        classification: &Classification,
        removed: &[TableName],
    ) -> Result<Outcome, ApplyError> {
        let ctx = Context {
            path,
            statement,
            table: Catalog::resolve(&classification.table),
            removed,
        };
        let parsed = tablewright_lang::parse(&statement.sql)
            .map_err(|error| ctx.error(ApplyErrorKind::Malformed { error }))?;

        let outcome = match parsed {
            Statement::CreateTable(create) => self.create_table(catalog, &create, &ctx)?,
            Statement::AlterTable(alter) => self.alter_table(catalog, &alter, &ctx)?,
            Statement::DropTable(drop) => self.drop_table(catalog, &drop, &ctx)?,
            Statement::Other => Outcome::Skipped,
        };

        debug!(
            file = %path.display(),
            line = statement.line,
            kind = %classification.kind,
            table = %ctx.table,
            outcome = ?outcome,
            "Replayed statement"
        );
        Ok(outcome)
    }

    fn create_table(
        &self,
        catalog: &mut Catalog,
        create: &CreateTable,
        ctx: &Context<'_>,
    ) -> Result<Outcome, ApplyError> {
        let name = Catalog::resolve(&create.name.value);
        if create.if_not_exists && catalog.contains(&name) {
            debug!(table = %name, "Table exists, skipping CREATE TABLE IF NOT EXISTS");
            return Ok(Outcome::Skipped);
        }

        match &create.source {
            TableSource::Definition => {}
            TableSource::Query => {
                return Err(ctx.error(ApplyErrorKind::Unsupported {
                    reason: format!("CREATE TABLE {} AS <query> has no column list", name),
                }));
            }
            TableSource::Like(template) => {
                return Err(ctx.error(ApplyErrorKind::Unsupported {
                    reason: format!(
                        "CREATE TABLE {} (LIKE {}) copies a definition that is not replayed",
                        name, template
                    ),
                }));
            }
        }

        let mut table = Table::new(name.schema.clone(), name.name.clone());
        let mut primary_key = Vec::new();
        for def in &create.columns {
            if table.has_column(&def.name.value) {
                return Err(ctx.error(ApplyErrorKind::DuplicateColumn {
                    table: name.clone(),
                    column: def.name.value.clone(),
                }));
            }
            if def.is_primary_key() {
                primary_key.push(def.name.value.clone());
            }
            table.push_column(column_from_def(def));
        }
        if !primary_key.is_empty() {
            table.set_primary_key(primary_key, None);
        }

        // Keys first, so that self-references resolve against this table.
        for constraint in &create.constraints {
            if !matches!(constraint, TableConstraint::ForeignKey { .. }) {
                apply_constraint(catalog, &mut table, constraint, ctx)?;
            }
        }
        for def in &create.columns {
            if let Some(reference) = def.references() {
                let fk = resolve_foreign_key(
                    catalog,
                    &table,
                    &reference.table,
                    reference.column.as_deref(),
                    None,
                );
                if let Some(column) = table.column_mut(&def.name.value) {
                    column.foreign_key = Some(fk);
                }
            }
        }
        for constraint in &create.constraints {
            if matches!(constraint, TableConstraint::ForeignKey { .. }) {
                apply_constraint(catalog, &mut table, constraint, ctx)?;
            }
        }

        table.refresh_roles();
        if catalog.insert(table).is_some() {
            debug!(table = %name, "Replaced existing table");
        }
        Ok(Outcome::Applied)
    }

    fn alter_table(
        &self,
        catalog: &mut Catalog,
        alter: &AlterTable,
        ctx: &Context<'_>,
    ) -> Result<Outcome, ApplyError> {
        let name = Catalog::resolve(&alter.name.value);
        let mut working = match catalog.table(&name) {
            Some(table) => table.clone(),
            None if alter.if_exists => {
                debug!(table = %name, "Table missing, skipping ALTER TABLE IF EXISTS");
                return Ok(Outcome::Skipped);
            }
            None => return Err(ctx.error(ApplyErrorKind::UnknownTable { table: name })),
        };

        let mut renamed_to = None;
        let mut column_renames = ColumnRenames::new();
        for action in &alter.actions {
            if let Some(target) =
                self.apply_action(catalog, &mut working, action, &mut column_renames, ctx)?
            {
                renamed_to = Some(target);
            }
        }
        working.refresh_roles();

        let current = working.table_name();
        if renamed_to.is_some() {
            catalog.remove(&name);
        }
        catalog.insert(working);
        if current != name {
            catalog.retarget_references(&name, &current);
        }
        for (from, to) in &column_renames {
            catalog.rename_referenced_column(&current, from, to);
        }
        Ok(Outcome::Applied)
    }

    /// Apply one ALTER action to the working copy. Returns the new table
    /// name for `RENAME TO`.
    fn apply_action(
        &self,
        catalog: &Catalog,
        table: &mut Table,
        action: &AlterAction,
        column_renames: &mut ColumnRenames,
        ctx: &Context<'_>,
    ) -> Result<Option<TableName>, ApplyError> {
        match action {
            AlterAction::AddColumn {
                if_not_exists,
                column: def,
            } => {
                let column_name = &def.name.value;
                if table.has_column(column_name) {
                    if *if_not_exists {
                        debug!(table = %table.table_name(), column = %column_name, "Column exists, skipping ADD COLUMN IF NOT EXISTS");
                        return Ok(None);
                    }
                    return Err(ctx.error(ApplyErrorKind::DuplicateColumn {
                        table: table.table_name(),
                        column: column_name.clone(),
                    }));
                }
                let mut column = column_from_def(def);
                if let Some(reference) = def.references() {
                    column.foreign_key = Some(resolve_foreign_key(
                        catalog,
                        table,
                        &reference.table,
                        reference.column.as_deref(),
                        None,
                    ));
                }
                table.push_column(column);
                if def.is_primary_key() {
                    table.set_primary_key(vec![column_name.clone()], None);
                }
            }

            AlterAction::DropColumn { if_exists, name } => {
                if table.remove_column(&name.value).is_none() {
                    if !*if_exists {
                        return Err(ctx.unknown_column(table, &name.value));
                    }
                    debug!(table = %table.table_name(), column = %name.value, "Column missing, skipping DROP COLUMN IF EXISTS");
                }
            }

            AlterAction::AlterColumn { name, change } => {
                if !self.dialect.supports_alter_column() {
                    warn!(
                        dialect = %self.dialect,
                        file = %ctx.path.display(),
                        line = ctx.statement.line,
                        table = %ctx.table,
                        column = %name.value,
                        "Applying ALTER COLUMN the dialect does not support"
                    );
                }
                let table_name = table.table_name();
                let Some(column) = table.column_mut(&name.value) else {
                    return Err(ctx.error(ApplyErrorKind::UnknownColumn {
                        table: table_name,
                        column: name.value.clone(),
                    }));
                };
                match change {
                    ColumnChange::SetType(data_type) => column.data_type = data_type.clone(),
                    ColumnChange::SetNotNull => column.is_nullable = false,
                    ColumnChange::DropNotNull => {
                        if column.is_primary_key {
                            return Err(ctx.error(ApplyErrorKind::Unsupported {
                                reason: format!(
                                    "column {} is in the primary key of {} and cannot be nullable",
                                    column.name, table_name
                                ),
                            }));
                        }
                        column.is_nullable = true;
                    }
                    ColumnChange::SetDefault(expr) => column.default = Some(expr.clone()),
                    ColumnChange::DropDefault => column.default = None,
                    ColumnChange::Other => {
                        debug!(table = %table_name, column = %name.value, "Ignoring ALTER COLUMN change");
                    }
                }
            }

            AlterAction::RenameColumn { from, to } => {
                if table.has_column(to) {
                    return Err(ctx.error(ApplyErrorKind::DuplicateColumn {
                        table: table.table_name(),
                        column: to.clone(),
                    }));
                }
                if !table.rename_column(&from.value, to) {
                    return Err(ctx.unknown_column(table, &from.value));
                }
                column_renames.push((from.value.clone(), to.clone()));
            }

            AlterAction::RenameTable { to } => {
                let target = rename_target(table, to);
                if target != table.table_name() && catalog.contains(&target) {
                    return Err(ctx.error(ApplyErrorKind::TableExists { table: target }));
                }
                table.schema = target.schema.clone();
                table.name = target.name.clone();
                return Ok(Some(target));
            }

            AlterAction::AddConstraint(constraint) => {
                apply_constraint(catalog, table, constraint, ctx)?;
            }

            AlterAction::DropConstraint { name, .. } => drop_constraint(table, name),

            AlterAction::DropPrimaryKey => table.clear_primary_key(),

            AlterAction::Other { keyword } => {
                debug!(table = %table.table_name(), action = %keyword, "Ignoring ALTER TABLE action");
            }
        }
        Ok(None)
    }

    fn drop_table(
        &self,
        catalog: &mut Catalog,
        drop: &DropTable,
        ctx: &Context<'_>,
    ) -> Result<Outcome, ApplyError> {
        let names: Vec<TableName> = drop
            .names
            .iter()
            .map(|name| Catalog::resolve(&name.value))
            .collect();

        // Check every name before removing anything.
        if !drop.if_exists {
            if let Some(missing) = names
                .iter()
                .find(|name| !catalog.contains(name) && !ctx.was_removed(name))
            {
                return Err(ctx.error_for(
                    missing.clone(),
                    ApplyErrorKind::UnknownTable {
                        table: missing.clone(),
                    },
                ));
            }
        }

        let mut dropped = 0;
        for name in &names {
            if catalog.remove(name).is_some() || ctx.was_removed(name) {
                dropped += 1;
            } else {
                debug!(table = %name, "Table missing, skipping DROP TABLE IF EXISTS");
            }
        }
        Ok(if dropped > 0 {
            Outcome::Applied
        } else {
            Outcome::Skipped
        })
    }
}

fn column_from_def(def: &ColumnDef) -> Column {
    let mut column = Column::new(def.name.value.clone(), def.data_type.clone());
    column.is_nullable = !def.is_not_null();
    column.default = def.default_expr().map(str::to_string);
    column.is_unique = def.is_unique();
    column
}

/// `RENAME TO` keeps the schema unless the new name is qualified.
fn rename_target(table: &Table, to: &ObjectName) -> TableName {
    match &to.schema {
        Some(_) => Catalog::resolve(to),
        None => TableName::new(table.schema.clone(), to.name.clone()),
    }
}

/// Resolve a foreign key target. Without an explicit column the key points
/// at the referenced table's single primary-key column.
fn resolve_foreign_key(
    catalog: &Catalog,
    current: &Table,
    target: &ObjectName,
    column: Option<&str>,
    constraint_name: Option<String>,
) -> ForeignKey {
    let referenced = Catalog::resolve(target);
    let referenced_column = match column {
        Some(column) => column.to_string(),
        None => {
            let key = if referenced == current.table_name() {
                current.primary_key_column_name()
            } else {
                catalog
                    .table(&referenced)
                    .and_then(|t| t.primary_key_column_name())
            };
            key.unwrap_or(DEFAULT_REFERENCED_COLUMN).to_string()
        }
    };
    ForeignKey {
        referenced_table: referenced.to_string(),
        referenced_column,
        constraint_name,
    }
}

fn apply_constraint(
    catalog: &Catalog,
    table: &mut Table,
    constraint: &TableConstraint,
    ctx: &Context<'_>,
) -> Result<(), ApplyError> {
    match constraint {
        TableConstraint::PrimaryKey { name, columns } => {
            require_columns(table, columns, ctx)?;
            table.set_primary_key(columns.clone(), name.clone());
        }
        TableConstraint::ForeignKey {
            name,
            columns,
            table: target,
            referenced_columns,
        } => {
            require_columns(table, columns, ctx)?;
            for (i, column_name) in columns.iter().enumerate() {
                let fk = resolve_foreign_key(
                    catalog,
                    table,
                    target,
                    referenced_columns.get(i).map(String::as_str),
                    name.clone(),
                );
                if let Some(column) = table.column_mut(column_name) {
                    column.foreign_key = Some(fk);
                }
            }
        }
        TableConstraint::Unique { columns, .. } => {
            require_columns(table, columns, ctx)?;
            if let [single] = columns.as_slice() {
                if let Some(column) = table.column_mut(single) {
                    column.is_unique = true;
                }
            }
        }
        TableConstraint::Check { .. } => {}
    }
    Ok(())
}

fn require_columns(table: &Table, columns: &[String], ctx: &Context<'_>) -> Result<(), ApplyError> {
    match columns.iter().find(|c| !table.has_column(c)) {
        Some(missing) => Err(ctx.unknown_column(table, missing)),
        None => Ok(()),
    }
}

/// Drop a tracked primary or foreign key by constraint name. PostgreSQL's
/// generated names (`t_pkey`, `t_col_fkey`) match unnamed keys.
fn drop_constraint(table: &mut Table, name: &str) {
    let pkey = table
        .primary_key_constraint
        .clone()
        .unwrap_or_else(|| format!("{}_pkey", table.name));
    if !table.primary_key.is_empty() && pkey == name {
        table.clear_primary_key();
        return;
    }

    let table_name = table.name.clone();
    let mut dropped = false;
    for column in &mut table.columns {
        let matches = column.foreign_key.as_ref().is_some_and(|fk| {
            match &fk.constraint_name {
                Some(constraint) => constraint == name,
                None => format!("{}_{}_fkey", table_name, column.name) == name,
            }
        });
        if matches {
            column.foreign_key = None;
            dropped = true;
        }
    }
    if !dropped {
        debug!(table = %table.table_name(), constraint = %name, "Dropped constraint is not tracked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ColumnRole;
    use pretty_assertions::assert_eq;

    fn replay(dialect: Dialect, statements: &[&str]) -> Result<Catalog, ApplyError> {
        let applier = DdlApplier::new(dialect);
        let mut catalog = Catalog::new();
        for (i, sql) in statements.iter().enumerate() {
            let statement = MigrationStatement {
                sql: sql.to_string(),
                line: i + 1,
            };
            applier.apply(&mut catalog, &statement, Path::new("001_init.sql"))?;
        }
        Ok(catalog)
    }

    fn pg(statements: &[&str]) -> Catalog {
        replay(Dialect::Postgres, statements).unwrap()
    }

    fn pg_err(statements: &[&str]) -> ApplyError {
        replay(Dialect::Postgres, statements).unwrap_err()
    }

    fn column_names(table: &Table) -> Vec<&str> {
        table.columns.iter().map(|c| c.name.as_str()).collect()
    }

    const USERS: &str = "CREATE TABLE users (
        id uuid PRIMARY KEY,
        email varchar(255) NOT NULL UNIQUE,
        status text NOT NULL DEFAULT 'active',
        created_at timestamptz NOT NULL DEFAULT now(),
        updated_at timestamptz
    )";

    #[test]
    fn test_create_table() {
        let catalog = pg(&[USERS]);
        let users = catalog.get_table("", "users").unwrap();
        assert_eq!(
            column_names(users),
            vec!["id", "email", "status", "created_at", "updated_at"]
        );
        assert_eq!(users.primary_key_column_name(), Some("id"));

        let id = users.column("id").unwrap();
        assert!(id.is_primary_key);
        assert!(!id.is_nullable);
        assert_eq!(id.role, ColumnRole::Identity);

        let email = users.column("email").unwrap();
        assert_eq!(email.data_type, "varchar(255)");
        assert!(email.is_unique);
        assert!(!email.is_nullable);

        assert_eq!(users.column("status").unwrap().default.as_deref(), Some("'active'"));
        assert_eq!(users.column("created_at").unwrap().role, ColumnRole::CreationTimestamp);
        assert!(users.column("updated_at").unwrap().is_nullable);
        assert_eq!(users.column("updated_at").unwrap().role, ColumnRole::UpdateTimestamp);
    }

    #[test]
    fn test_foreign_keys() {
        let catalog = pg(&[
            USERS,
            "CREATE TABLE posts (
                id uuid PRIMARY KEY,
                author_id uuid NOT NULL REFERENCES users,
                parent_id uuid REFERENCES posts,
                editor_id uuid,
                CONSTRAINT posts_editor_fk FOREIGN KEY (editor_id) REFERENCES public.users (id)
            )",
        ]);
        let posts = catalog.get_table("", "posts").unwrap();
        let fk = |name: &str| posts.column(name).unwrap().foreign_key.clone().unwrap();

        assert_eq!(fk("author_id").referenced_table, "users");
        assert_eq!(fk("author_id").referenced_column, "id");
        assert_eq!(fk("parent_id").referenced_table, "posts");
        assert_eq!(fk("editor_id").constraint_name.as_deref(), Some("posts_editor_fk"));
    }

    #[test]
    fn test_table_level_primary_key() {
        let catalog = pg(&[
            "CREATE TABLE memberships (
                user_id uuid,
                group_id uuid,
                role text,
                CONSTRAINT memberships_pk PRIMARY KEY (user_id, group_id)
            )",
        ]);
        let table = catalog.get_table("", "memberships").unwrap();
        assert!(table.has_composite_key());
        assert_eq!(table.primary_key_column_name(), None);
        assert_eq!(table.primary_key_constraint.as_deref(), Some("memberships_pk"));
        assert!(!table.column("group_id").unwrap().is_nullable);
        assert!(table.column("role").unwrap().is_nullable);
    }

    #[test]
    fn test_create_replaces_and_if_not_exists_skips() {
        let catalog = pg(&[
            "CREATE TABLE t (a int)",
            "CREATE TABLE IF NOT EXISTS t (b int)",
        ]);
        assert_eq!(column_names(catalog.get_table("", "t").unwrap()), vec!["a"]);

        let catalog = pg(&["CREATE TABLE t (a int)", "CREATE TABLE t (b int)"]);
        assert_eq!(column_names(catalog.get_table("", "t").unwrap()), vec!["b"]);
    }

    #[test]
    fn test_create_errors() {
        let err = pg_err(&["CREATE TABLE t (a int, a text)"]);
        assert!(matches!(err.kind, ApplyErrorKind::DuplicateColumn { ref column, .. } if column == "a"));

        let err = pg_err(&["CREATE TABLE archive AS SELECT * FROM users"]);
        assert!(matches!(err.kind, ApplyErrorKind::Unsupported { .. }));

        let err = pg_err(&["CREATE TABLE t (a int, PRIMARY KEY (b))"]);
        assert!(matches!(err.kind, ApplyErrorKind::UnknownColumn { ref column, .. } if column == "b"));
    }

    #[test]
    fn test_add_and_drop_columns() {
        let catalog = pg(&[
            USERS,
            "ALTER TABLE users ADD COLUMN age integer NULL",
            "ALTER TABLE users ADD COLUMN IF NOT EXISTS age bigint",
            "ALTER TABLE users DROP COLUMN status",
            "ALTER TABLE users DROP COLUMN IF EXISTS nickname",
        ]);
        let users = catalog.get_table("", "users").unwrap();
        assert_eq!(
            column_names(users),
            vec!["id", "email", "created_at", "updated_at", "age"]
        );
        assert_eq!(users.column("age").unwrap().data_type, "integer");

        let err = pg_err(&[USERS, "ALTER TABLE users ADD COLUMN email text"]);
        assert!(matches!(err.kind, ApplyErrorKind::DuplicateColumn { .. }));

        let err = pg_err(&[USERS, "ALTER TABLE users DROP COLUMN nickname"]);
        assert_eq!(err.line, 2);
        assert_eq!(
            err.kind,
            ApplyErrorKind::UnknownColumn {
                table: TableName::unqualified("users"),
                column: "nickname".to_string(),
            }
        );
    }

    #[test]
    fn test_alter_column() {
        let catalog = pg(&[
            USERS,
            "ALTER TABLE users ALTER COLUMN email TYPE text, ALTER COLUMN email DROP NOT NULL",
            "ALTER TABLE users ALTER COLUMN updated_at SET NOT NULL",
            "ALTER TABLE users ALTER COLUMN status DROP DEFAULT",
        ]);
        let users = catalog.get_table("", "users").unwrap();
        let email = users.column("email").unwrap();
        assert_eq!(email.data_type, "text");
        assert!(email.is_nullable);
        assert!(!users.column("updated_at").unwrap().is_nullable);
        assert_eq!(users.column("status").unwrap().default, None);

        let err = pg_err(&[USERS, "ALTER TABLE users ALTER COLUMN id DROP NOT NULL"]);
        assert!(matches!(err.kind, ApplyErrorKind::Unsupported { .. }));
    }

    #[test]
    fn test_sqlite_alter_column_still_applies() {
        let catalog = replay(
            Dialect::Sqlite,
            &[
                USERS,
                "ALTER TABLE users ALTER COLUMN email TYPE varchar(320)",
                "ALTER TABLE users ALTER COLUMN email DROP NOT NULL",
            ],
        )
        .unwrap();
        let email = catalog.get_table("", "users").unwrap().column("email").unwrap();
        assert_eq!(email.data_type, "varchar(320)");
        assert!(email.is_nullable);
    }

    #[test]
    fn test_alter_is_atomic() {
        let mut catalog = pg(&[USERS]);
        let before = catalog.clone();
        let statement = MigrationStatement {
            sql: "ALTER TABLE users ADD COLUMN age int, DROP COLUMN nickname".to_string(),
            line: 3,
        };
        let err = DdlApplier::new(Dialect::Postgres)
            .apply(&mut catalog, &statement, Path::new("002.sql"))
            .unwrap_err();
        assert_eq!(err.to_string(), "002.sql:3: column nickname does not exist in table users");
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_renames() {
        let catalog = pg(&[
            USERS,
            "CREATE TABLE posts (id uuid PRIMARY KEY, author_id uuid REFERENCES users (id))",
            "ALTER TABLE users RENAME COLUMN id TO user_id",
            "ALTER TABLE users RENAME TO accounts",
        ]);
        assert!(catalog.get_table("", "users").is_err());
        let accounts = catalog.get_table("", "accounts").unwrap();
        assert_eq!(accounts.primary_key_column_name(), Some("user_id"));
        assert_eq!(accounts.column("user_id").unwrap().role, ColumnRole::Identity);

        let fk = catalog.get_table("", "posts").unwrap().column("author_id").unwrap();
        let fk = fk.foreign_key.as_ref().unwrap();
        assert_eq!(fk.referenced_table, "accounts");
        assert_eq!(fk.referenced_column, "user_id");

        let err = pg_err(&[
            "CREATE TABLE a (id uuid)",
            "CREATE TABLE b (id uuid)",
            "ALTER TABLE a RENAME TO b",
        ]);
        assert!(matches!(err.kind, ApplyErrorKind::TableExists { .. }));
    }

    #[test]
    fn test_constraints() {
        let catalog = pg(&[
            "CREATE TABLE tags (id uuid, label text, owner_id uuid REFERENCES users)",
            "ALTER TABLE tags ADD CONSTRAINT tags_pk PRIMARY KEY (id), ADD UNIQUE (label)",
        ]);
        let tags = catalog.get_table("", "tags").unwrap();
        assert_eq!(tags.primary_key_column_name(), Some("id"));
        assert!(tags.column("label").unwrap().is_unique);

        let catalog = pg(&[
            "CREATE TABLE tags (id uuid, label text, owner_id uuid REFERENCES users)",
            "ALTER TABLE tags ADD CONSTRAINT tags_pk PRIMARY KEY (id)",
            "ALTER TABLE tags DROP CONSTRAINT tags_pk, DROP CONSTRAINT tags_owner_id_fkey",
        ]);
        let tags = catalog.get_table("", "tags").unwrap();
        assert!(tags.primary_key.is_empty());
        assert!(!tags.column("id").unwrap().is_primary_key);
        assert!(tags.column("owner_id").unwrap().foreign_key.is_none());

        let catalog = pg(&[USERS, "ALTER TABLE users DROP CONSTRAINT users_pkey"]);
        assert!(catalog.get_table("", "users").unwrap().primary_key.is_empty());
    }

    #[test]
    fn test_drop_table() {
        let catalog = pg(&[
            USERS,
            "CREATE TABLE posts (id uuid PRIMARY KEY)",
            "DROP TABLE users, posts",
            "DROP TABLE IF EXISTS users",
        ]);
        assert!(catalog.is_empty());

        let err = pg_err(&[USERS, "DROP TABLE users, posts"]);
        assert_eq!(err.table, TableName::unqualified("posts"));
    }

    #[test]
    fn test_unknown_table_errors() {
        let err = pg_err(&["ALTER TABLE users ADD COLUMN age int"]);
        assert_eq!(err.path, Path::new("001_init.sql"));
        assert_eq!(err.line, 1);
        assert_eq!(err.statement, "ALTER TABLE users ADD COLUMN age int");
        assert_eq!(
            err.kind,
            ApplyErrorKind::UnknownTable {
                table: TableName::unqualified("users")
            }
        );

        let catalog = pg(&["ALTER TABLE IF EXISTS users ADD COLUMN age int"]);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_malformed_and_ignored_statements() {
        let err = pg_err(&[USERS, "ALTER TABLE users ALTER COLUMN email SET NOT"]);
        assert!(matches!(err.kind, ApplyErrorKind::Malformed { .. }));
        assert!(err.diagnostic().contains("expected NULL"));

        let catalog = pg(&[
            USERS,
            "CREATE INDEX users_email ON users (email)",
            "INSERT INTO users (id) VALUES ('x')",
            "ALTER TABLE users OWNER TO admin",
        ]);
        assert_eq!(catalog.get_table("", "users").unwrap().columns.len(), 5);
    }

    #[test]
    fn test_schemas_and_quoted_names() {
        let catalog = pg(&[
            "CREATE TABLE public.users (id uuid PRIMARY KEY)",
            "CREATE TABLE audit.events (id uuid PRIMARY KEY)",
            r#"CREATE TABLE "Accounts" ("ID" uuid PRIMARY KEY)"#,
            "ALTER TABLE users ADD COLUMN name text",
        ]);
        assert_eq!(catalog.get_table("public", "users").unwrap().columns.len(), 2);
        assert_eq!(catalog.get_table("audit", "events").unwrap().schema, "audit");
        assert!(catalog.get_table("", "events").is_err());
        let accounts = catalog.get_table("", "Accounts").unwrap();
        assert_eq!(accounts.primary_key_column_name(), Some("ID"));
    }
}
