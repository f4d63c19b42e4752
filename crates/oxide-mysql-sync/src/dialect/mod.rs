//! Database dialect implementations.
//!
//! A dialect renders table specs as DDL and turns a [`TableChanges`] set
//! into the statements that apply it.

mod mysql;

pub use mysql::MySqlDialect;

use crate::table::{quote_ident, quoted_column_list, TableChanges, TableIndex, TableSpec};

/// Trait for database-specific DDL generation.
pub trait SchemaDialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Generates the `CREATE TABLE` statement of a table.
    fn create_table_sql(&self, table: &TableSpec) -> String;

    /// Generates the statements that bring a live table in line with
    /// `table`, in execution order.
    fn sync_sql(&self, table: &TableSpec, changes: &TableChanges) -> Vec<String>;

    /// Quote an identifier (table name, column name, etc.).
    fn quote_identifier(&self, name: &str) -> String {
        quote_ident(name)
    }

    /// Generates SQL for creating an index.
    fn create_index_sql(&self, table: &str, index: &TableIndex) -> String {
        format!(
            "CREATE {}INDEX {} ON {} ({})",
            if index.is_unique() { "UNIQUE " } else { "" },
            self.quote_identifier(index.name()),
            self.quote_identifier(table),
            quoted_column_list(index.columns())
        )
    }

    /// Generates SQL for dropping an index.
    fn drop_index_sql(&self, table: &str, index: &TableIndex) -> String {
        format!(
            "DROP INDEX {} ON {}",
            self.quote_identifier(index.name()),
            self.quote_identifier(table)
        )
    }

    /// Generates every statement needed to create a table from scratch:
    /// the `CREATE TABLE` followed by its table-level indexes.
    fn create_sql(&self, table: &TableSpec) -> Vec<String> {
        let mut statements = vec![self.create_table_sql(table)];
        statements.extend(
            table
                .indexes()
                .iter()
                .map(|index| self.create_index_sql(table.name(), index)),
        );
        statements
    }
}
