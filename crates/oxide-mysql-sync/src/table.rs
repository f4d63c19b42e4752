//! Table descriptors and change-set computation.
//!
//! A [`TableSpec`] is the desired shape of a table. [`TableChanges`] is the
//! difference between a live table and a spec, consumed by
//! [`SchemaDialect::sync_sql`](crate::dialect::SchemaDialect::sync_sql).

use std::collections::HashMap;

use crate::column::ColumnKind;

/// Builds the conventional index name `ix_<table>_<col1>_<col2>...`.
#[must_use]
pub fn index_name(table: &str, columns: &[String]) -> String {
    format!("ix_{}_{}", table, columns.join("_"))
}

/// Quotes a MySQL identifier, doubling any embedded backtick.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Joins column names as a backtick-quoted, comma separated list.
#[must_use]
pub fn quoted_column_list<S: AsRef<str>>(columns: &[S]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIndex {
    name: String,
    columns: Vec<String>,
    unique: bool,
}

impl TableIndex {
    /// Creates an index with an explicit name.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<String>, unique: bool) -> Self {
        Self {
            name: name.into(),
            columns,
            unique,
        }
    }

    /// Creates an index named after the table and its columns.
    #[must_use]
    pub fn for_table(table: &str, columns: Vec<String>, unique: bool) -> Self {
        Self::new(index_name(table, &columns), columns, unique)
    }

    /// Index name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Indexed columns, in key order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether this is a unique index.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Whether both indexes cover the same columns in the same order with
    /// the same uniqueness. Names are not compared.
    #[must_use]
    pub fn is_identical(&self, other: &Self) -> bool {
        self.unique == other.unique && self.columns == other.columns
    }

    /// Whether this index can back `constraint`: its key starts with the
    /// constraint's referencing columns. MySQL refuses to drop such an index
    /// while the foreign key exists.
    #[must_use]
    pub fn backs_constraint(&self, constraint: &TableConstraint) -> bool {
        !constraint.columns.is_empty() && self.columns.starts_with(&constraint.columns)
    }
}

/// A foreign key constraint, as found in a live table definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableConstraint {
    name: String,
    columns: Vec<String>,
    referenced_table: String,
    referenced_columns: Vec<String>,
}

impl TableConstraint {
    /// Creates a foreign key descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        referenced_table: impl Into<String>,
        referenced_columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            referenced_table: referenced_table.into(),
            referenced_columns,
        }
    }

    /// Constraint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Referencing columns.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Referenced table.
    #[must_use]
    pub fn referenced_table(&self) -> &str {
        &self.referenced_table
    }

    /// Referenced columns.
    #[must_use]
    pub fn referenced_columns(&self) -> &[String] {
        &self.referenced_columns
    }
}

/// The desired definition of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    name: String,
    columns: Vec<ColumnKind>,
    indexes: Vec<TableIndex>,
}

impl TableSpec {
    /// Creates an empty table spec.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: ColumnKind) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a table-level index.
    #[must_use]
    pub fn index(mut self, index: TableIndex) -> Self {
        self.indexes.push(index);
        self
    }

    /// Appends a table-level index named `ix_<table>_<cols>`.
    #[must_use]
    pub fn add_index(self, columns: &[&str], unique: bool) -> Self {
        let columns = columns.iter().map(ToString::to_string).collect();
        let index = TableIndex::for_table(&self.name, columns, unique);
        self.index(index)
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnKind] {
        &self.columns
    }

    /// Table-level indexes.
    #[must_use]
    pub fn indexes(&self) -> &[TableIndex] {
        &self.indexes
    }

    /// Looks up a column by database name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnKind> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Primary key columns, in declaration order.
    #[must_use]
    pub fn primary_columns(&self) -> Vec<&ColumnKind> {
        self.columns.iter().filter(|c| c.is_primary()).collect()
    }

    /// The single-column indexes requested by `index` tags.
    #[must_use]
    pub fn column_indexes(&self) -> Vec<TableIndex> {
        self.columns
            .iter()
            .filter(|c| c.is_index())
            .map(|c| TableIndex::for_table(&self.name, vec![c.name().to_string()], false))
            .collect()
    }

    /// Every secondary index the table should have: the column indexes
    /// followed by the table-level ones.
    #[must_use]
    pub fn all_indexes(&self) -> Vec<TableIndex> {
        let mut indexes = self.column_indexes();
        indexes.extend(self.indexes.iter().cloned());
        indexes
    }

    /// Starting value of the auto-increment sequence, if a primary
    /// auto-increment column declares a non-zero one.
    #[must_use]
    pub fn auto_increment_offset(&self) -> Option<u64> {
        self.columns.iter().find_map(|c| match c {
            ColumnKind::Integer(i) if c.is_primary() && i.auto_increment => {
                Some(i.auto_increment_offset()).filter(|&o| o > 0)
            }
            _ => None,
        })
    }
}

/// A column whose definition changes.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatedColumn {
    /// Live definition.
    pub old: ColumnKind,
    /// Desired definition. A different name renames the column.
    pub new: ColumnKind,
}

impl UpdatedColumn {
    /// Pairs a live column with its desired definition.
    #[must_use]
    pub fn new(old: ColumnKind, new: ColumnKind) -> Self {
        Self { old, new }
    }

    /// Whether the column is renamed.
    #[must_use]
    pub fn is_rename(&self) -> bool {
        self.old.name() != self.new.name()
    }

    /// Whether the column enters or leaves the primary key.
    #[must_use]
    pub fn flips_primary(&self) -> bool {
        self.old.is_primary() != self.new.is_primary()
    }
}

/// The differences between a live table and its desired definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableChanges {
    /// Every live column, in table order.
    pub old_columns: Vec<ColumnKind>,
    /// Columns to add, in declaration order.
    pub add_columns: Vec<ColumnKind>,
    /// Live columns absent from the desired definition.
    pub remove_columns: Vec<ColumnKind>,
    /// Columns whose definition changes.
    pub updated_columns: Vec<UpdatedColumn>,
    /// Indexes to create.
    pub add_indexes: Vec<TableIndex>,
    /// Indexes to drop.
    pub remove_indexes: Vec<TableIndex>,
}

impl TableChanges {
    /// Computes the changes that turn the live columns and indexes into
    /// `table`.
    ///
    /// Columns are matched by name and compared by normalized definition, so
    /// a live `INT(11)` matches a declared `INT`. Indexes are matched by
    /// column list and uniqueness. Live indexes backing one of
    /// `constraints` are never scheduled for removal.
    #[must_use]
    pub fn diff(
        old_columns: Vec<ColumnKind>,
        table: &TableSpec,
        old_indexes: &[TableIndex],
        constraints: &[TableConstraint],
    ) -> Self {
        let live: HashMap<&str, &ColumnKind> =
            old_columns.iter().map(|c| (c.name(), c)).collect();

        let mut add_columns = Vec::new();
        let mut updated_columns = Vec::new();
        for column in table.columns() {
            match live.get(column.name()) {
                None => add_columns.push(column.clone()),
                Some(&old) if !old.same_definition(column) => {
                    updated_columns.push(UpdatedColumn::new(old.clone(), column.clone()));
                }
                Some(_) => {}
            }
        }

        let remove_columns = old_columns
            .iter()
            .filter(|c| table.get_column(c.name()).is_none())
            .cloned()
            .collect();

        let desired = table.all_indexes();
        let add_indexes = desired
            .iter()
            .filter(|want| !old_indexes.iter().any(|have| have.is_identical(want)))
            .cloned()
            .collect();
        let remove_indexes = old_indexes
            .iter()
            .filter(|have| !desired.iter().any(|want| want.is_identical(have)))
            .filter(|have| !constraints.iter().any(|fk| have.backs_constraint(fk)))
            .cloned()
            .collect();

        Self {
            old_columns,
            add_columns,
            remove_columns,
            updated_columns,
            add_indexes,
            remove_indexes,
        }
    }

    /// Whether nothing needs to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add_columns.is_empty()
            && self.remove_columns.is_empty()
            && self.updated_columns.is_empty()
            && self.add_indexes.is_empty()
            && self.remove_indexes.is_empty()
    }

    /// Whether the primary key has to be rebuilt: a removed column was
    /// primary, an updated column enters or leaves the key, or an added
    /// column is primary.
    #[must_use]
    pub fn primary_key_changed(&self) -> bool {
        self.remove_columns.iter().any(ColumnKind::is_primary)
            || self.updated_columns.iter().any(UpdatedColumn::flips_primary)
            || self.add_columns.iter().any(ColumnKind::is_primary)
    }
}
