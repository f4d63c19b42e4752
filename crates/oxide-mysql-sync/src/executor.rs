//! Schema executor.
//!
//! This module introspects live tables and applies the statements a dialect
//! generates for them.

use sqlx::mysql::MySqlPool;
use tracing::{debug, info};

use crate::column::ColumnKind;
use crate::definition::{parse_constraints, parse_indexes};
use crate::dialect::SchemaDialect;
use crate::error::Result;
use crate::introspect::{fetch_create_definition, fetch_live_columns};
use crate::table::{TableChanges, TableConstraint, TableIndex, TableSpec};

/// What a sync has to do for one table.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncPlan {
    /// The table does not exist yet.
    Create(Vec<String>),
    /// The table exists; these statements bring it up to date.
    Alter {
        /// The computed changes.
        changes: TableChanges,
        /// Statements in execution order.
        statements: Vec<String>,
    },
}

impl SyncPlan {
    /// Statements in execution order.
    #[must_use]
    pub fn statements(&self) -> &[String] {
        match self {
            Self::Create(statements) | Self::Alter { statements, .. } => statements,
        }
    }

    /// Whether nothing needs to run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements().is_empty()
    }
}

/// Introspects and synchronizes tables of a MySQL database.
pub struct SchemaExecutor<D: SchemaDialect> {
    pool: MySqlPool,
    dialect: D,
    dry_run: bool,
}

impl<D: SchemaDialect> SchemaExecutor<D> {
    /// Creates a new schema executor.
    pub fn new(pool: MySqlPool, dialect: D) -> Self {
        Self {
            pool,
            dialect,
            dry_run: false,
        }
    }

    /// Enables dry-run mode (SQL is printed but not executed).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Checks whether a table exists in the current database.
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM information_schema.tables WHERE table_schema = DATABASE() AND table_name = ?",
        )
        .bind(table)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Returns the live columns of a table.
    pub async fn fetch_columns(&self, table: &str) -> Result<Vec<ColumnKind>> {
        fetch_live_columns(&self.pool, table).await
    }

    /// Returns the secondary indexes and foreign keys of a live table.
    pub async fn fetch_indexes(
        &self,
        table: &str,
    ) -> Result<(Vec<TableIndex>, Vec<TableConstraint>)> {
        let definition = fetch_create_definition(&self.pool, table).await?;
        Ok((parse_indexes(&definition), parse_constraints(&definition)))
    }

    /// Computes what a sync of `table` would execute.
    pub async fn plan(&self, table: &TableSpec) -> Result<SyncPlan> {
        if !self.table_exists(table.name()).await? {
            return Ok(SyncPlan::Create(self.dialect.create_sql(table)));
        }
        let columns = self.fetch_columns(table.name()).await?;
        let (indexes, constraints) = self.fetch_indexes(table.name()).await?;
        let changes = TableChanges::diff(columns, table, &indexes, &constraints);
        let statements = self.dialect.sync_sql(table, &changes);
        Ok(SyncPlan::Alter {
            changes,
            statements,
        })
    }

    /// Creates `table` or brings the live table in line with it.
    pub async fn sync(&self, table: &TableSpec) -> Result<SyncPlan> {
        let plan = self.plan(table).await?;
        if plan.is_empty() {
            info!(table = %table.name(), "Table is up to date");
            return Ok(plan);
        }

        info!(
            table = %table.name(),
            dialect = self.dialect.name(),
            statements = plan.statements().len(),
            "Synchronizing table"
        );
        self.execute_all(plan.statements()).await?;
        Ok(plan)
    }

    /// Executes statements in order, stopping at the first failure.
    pub async fn execute_all(&self, statements: &[String]) -> Result<()> {
        for sql in statements {
            info!(sql = %sql, "Executing SQL");
            if self.dry_run {
                println!("{sql};");
            } else {
                sqlx::query(sql).execute(&self.pool).await?;
                debug!(sql = %sql, "Executed");
            }
        }
        Ok(())
    }
}
