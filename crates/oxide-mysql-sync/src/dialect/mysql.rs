//! MySQL dialect.
//!
//! MySQL can alter most of a table in a single `ALTER TABLE`, so all column
//! and primary key changes of a sync are merged into one statement. Index
//! drops run before it and index creations after it.

use std::fmt::Write as _;

use tracing::info;

use crate::column::ColumnKind;
use crate::table::{quoted_column_list, TableChanges, TableSpec};

use super::SchemaDialect;

/// Table options appended to every `CREATE TABLE`.
pub const TABLE_OPTIONS: &str = "ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci";

/// MySQL schema dialect.
#[derive(Debug, Clone, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// The clause relaxing a column that is no longer declared, if it needs
    /// one. Auto-increment is cleared and a NOT NULL column without default
    /// becomes nullable, so that inserts from the new schema keep working.
    fn relax_removed_column(column: &ColumnKind) -> Option<String> {
        let mut relaxed = column.clone();
        let mut changed = false;
        if relaxed.is_auto_increment() {
            relaxed.clear_auto_increment();
            changed = true;
        }
        if !relaxed.is_nullable() && relaxed.default().is_none() {
            relaxed.set_nullable(true);
            changed = true;
        }
        changed.then(|| format!("MODIFY COLUMN {}", relaxed.definition_string()))
    }
}

impl SchemaDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn create_table_sql(&self, table: &TableSpec) -> String {
        let mut defs: Vec<String> = table
            .columns()
            .iter()
            .map(ColumnKind::definition_string)
            .collect();

        let primary: Vec<&str> = table
            .primary_columns()
            .into_iter()
            .map(ColumnKind::name)
            .collect();
        if !primary.is_empty() {
            defs.push(format!("PRIMARY KEY ({})", quoted_column_list(&primary)));
        }

        for index in table.column_indexes() {
            defs.push(format!(
                "KEY {} ({})",
                self.quote_identifier(index.name()),
                quoted_column_list(index.columns())
            ));
        }

        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n) {}",
            self.quote_identifier(table.name()),
            defs.join(",\n  "),
            TABLE_OPTIONS
        );
        if let Some(offset) = table.auto_increment_offset() {
            let _ = write!(sql, " AUTO_INCREMENT={offset}");
        }
        sql
    }

    fn sync_sql(&self, table: &TableSpec, changes: &TableChanges) -> Vec<String> {
        let table_name = self.quote_identifier(table.name());
        let mut statements: Vec<String> = changes
            .remove_indexes
            .iter()
            .map(|index| self.drop_index_sql(table.name(), index))
            .collect();

        let mut alters = Vec::new();

        let primary_changed = changes.primary_key_changed();
        if primary_changed && changes.old_columns.iter().any(ColumnKind::is_primary) {
            alters.push("DROP PRIMARY KEY".to_string());
        }

        for column in &changes.remove_columns {
            info!(
                table = %table.name(),
                column = %column.name(),
                "Column no longer declared, skipping DROP COLUMN"
            );
            if let Some(clause) = Self::relax_removed_column(column) {
                alters.push(clause);
            }
        }

        for update in &changes.updated_columns {
            if update.is_rename() {
                alters.push(format!(
                    "CHANGE COLUMN {} {}",
                    self.quote_identifier(update.old.name()),
                    update.new.definition_string()
                ));
            } else {
                alters.push(format!("MODIFY COLUMN {}", update.new.definition_string()));
            }
        }

        for column in &changes.add_columns {
            alters.push(format!("ADD COLUMN {}", column.definition_string()));
        }

        if primary_changed {
            let primary: Vec<&str> = table
                .primary_columns()
                .into_iter()
                .map(ColumnKind::name)
                .collect();
            if !primary.is_empty() {
                alters.push(format!("ADD PRIMARY KEY({})", quoted_column_list(&primary)));
            }
        }

        if !alters.is_empty() {
            statements.push(format!("ALTER TABLE {} {}", table_name, alters.join(", ")));
        }

        statements.extend(
            changes
                .add_indexes
                .iter()
                .map(|index| self.create_index_sql(table.name(), index)),
        );

        statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::FieldType;
    use crate::table::{TableIndex, UpdatedColumn};
    use crate::tags::{
        Tags, TAG_AUTOINCREMENT, TAG_DEFAULT, TAG_INDEX, TAG_NULLABLE, TAG_PRIMARY, TAG_WIDTH,
    };

    fn col(name: &str, field_type: FieldType, tags: &[(&str, &str)]) -> ColumnKind {
        let tags: Tags = tags.iter().copied().collect();
        ColumnKind::for_field(name, field_type, tags, false).unwrap()
    }

    fn varchar(name: &str, width: &str) -> ColumnKind {
        col(name, FieldType::String, &[(TAG_WIDTH, width)])
    }

    fn id36() -> ColumnKind {
        col(
            "id",
            FieldType::String,
            &[(TAG_WIDTH, "36"), (TAG_PRIMARY, "true")],
        )
    }

    #[test]
    fn test_create_table_sql() {
        let table = TableSpec::new("users")
            .column(col(
                "id",
                FieldType::Int64,
                &[(TAG_AUTOINCREMENT, "true")],
            ))
            .column(col(
                "email",
                FieldType::String,
                &[(TAG_WIDTH, "64"), (TAG_INDEX, "true"), (TAG_NULLABLE, "false")],
            ))
            .column(col(
                "enabled",
                FieldType::Bool,
                &[(TAG_DEFAULT, "false"), (TAG_NULLABLE, "false")],
            ));
        let sql = MySqlDialect::new().create_table_sql(&table);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS `users` (\n  \
             `id` BIGINT NOT NULL AUTO_INCREMENT,\n  \
             `email` VARCHAR(64) CHARACTER SET 'utf8mb4' COLLATE 'utf8mb4_unicode_ci' NOT NULL,\n  \
             `enabled` TINYINT(1) NOT NULL DEFAULT 0,\n  \
             PRIMARY KEY (`id`),\n  \
             KEY `ix_users_email` (`email`)\n\
             ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci"
        );
    }

    #[test]
    fn test_identifiers_escape_backticks() {
        let table = TableSpec::new("odd`name").column(varchar("we`ird", "8"));
        let sql = MySqlDialect::new().create_table_sql(&table);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS `odd``name` (\n  `we``ird` VARCHAR(8)"));
        let index = TableIndex::new("ix", vec!["we`ird".to_string()], false);
        assert_eq!(
            MySqlDialect::new().create_index_sql("odd`name", &index),
            "CREATE INDEX `ix` ON `odd``name` (`we``ird`)"
        );
    }

    #[test]
    fn test_create_table_primary_key_declaration_order() {
        let table = TableSpec::new("memberships")
            .column(col("user_id", FieldType::String, &[(TAG_WIDTH, "36"), (TAG_PRIMARY, "true")]))
            .column(col("group_id", FieldType::String, &[(TAG_WIDTH, "36"), (TAG_PRIMARY, "true")]))
            .column(col("alpha", FieldType::String, &[(TAG_WIDTH, "8"), (TAG_PRIMARY, "true")]));
        let sql = MySqlDialect::new().create_table_sql(&table);
        assert!(sql.contains("PRIMARY KEY (`user_id`, `group_id`, `alpha`)"));
        assert!(!sql.contains("AUTO_INCREMENT"));
    }

    #[test]
    fn test_create_table_auto_increment_offset() {
        let table = TableSpec::new("orders").column(col(
            "id",
            FieldType::UInt64,
            &[(TAG_AUTOINCREMENT, "1000")],
        ));
        let sql = MySqlDialect::new().create_table_sql(&table);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS `orders` (\n  `id` BIGINT UNSIGNED NOT NULL AUTO_INCREMENT"));
        assert!(sql.ends_with(") ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci AUTO_INCREMENT=1000"));
    }

    #[test]
    fn test_create_sql_with_table_indexes() {
        let table = TableSpec::new("posts")
            .column(varchar("author", "36"))
            .column(varchar("slug", "64"))
            .add_index(&["author", "slug"], true);
        let statements = MySqlDialect::new().create_sql(&table);
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[1],
            "CREATE UNIQUE INDEX `ix_posts_author_slug` ON `posts` (`author`, `slug`)"
        );
    }

    #[test]
    fn test_sync_modify_and_add() {
        let table = TableSpec::new("users")
            .column(id36())
            .column(varchar("name", "128"))
            .column(varchar("email", "64"));
        let live = vec![id36(), varchar("name", "64")];
        let changes = TableChanges::diff(live, &table, &[], &[]);
        let statements = MySqlDialect::new().sync_sql(&table, &changes);
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE `users` \
                 MODIFY COLUMN `name` VARCHAR(128) CHARACTER SET 'utf8mb4' COLLATE 'utf8mb4_unicode_ci', \
                 ADD COLUMN `email` VARCHAR(64) CHARACTER SET 'utf8mb4' COLLATE 'utf8mb4_unicode_ci'"
                    .to_string()
            ]
        );
        assert!(!statements[0].contains("PRIMARY KEY"));
    }

    #[test]
    fn test_sync_identical_is_noop() {
        let table = TableSpec::new("users")
            .column(id36())
            .column(col("count", FieldType::Int32, &[(TAG_INDEX, "true")]));
        let live_count = col("count", FieldType::Int32, &[(TAG_WIDTH, "11")]);
        let changes = TableChanges::diff(
            vec![id36(), live_count],
            &table,
            &table.all_indexes(),
            &[],
        );
        assert!(changes.is_empty());
        assert!(MySqlDialect::new().sync_sql(&table, &changes).is_empty());
    }

    #[test]
    fn test_sync_primary_key_change_ordering() {
        let table = TableSpec::new("users")
            .column(id36())
            .column(col(
                "tenant",
                FieldType::String,
                &[(TAG_WIDTH, "36"), (TAG_PRIMARY, "true")],
            ));
        let live = vec![id36()];
        let changes = TableChanges::diff(live, &table, &[], &[]);
        let statements = MySqlDialect::new().sync_sql(&table, &changes);
        assert_eq!(statements.len(), 1);
        let sql = &statements[0];
        let drop = sql.find("DROP PRIMARY KEY").unwrap();
        let add_col = sql.find("ADD COLUMN `tenant`").unwrap();
        let add_pk = sql.find("ADD PRIMARY KEY(`id`, `tenant`)").unwrap();
        assert!(sql.starts_with("ALTER TABLE `users` DROP PRIMARY KEY, "));
        assert!(drop < add_col && add_col < add_pk);
    }

    #[test]
    fn test_sync_no_drop_primary_without_old_primary() {
        let table = TableSpec::new("logs").column(id36());
        let live = vec![varchar("message", "255")];
        let changes = TableChanges::diff(live, &table, &[], &[]);
        let statements = MySqlDialect::new().sync_sql(&table, &changes);
        assert_eq!(statements.len(), 1);
        assert!(!statements[0].contains("DROP PRIMARY KEY"));
        assert!(statements[0].ends_with("ADD PRIMARY KEY(`id`)"));
    }

    #[test]
    fn test_sync_removed_columns_are_relaxed_not_dropped() {
        let table = TableSpec::new("users").column(id36());
        let live = vec![
            id36(),
            col("legacy", FieldType::String, &[(TAG_WIDTH, "16"), (TAG_NULLABLE, "false")]),
            col(
                "flag",
                FieldType::Int32,
                &[(TAG_NULLABLE, "false"), (TAG_DEFAULT, "0")],
            ),
            varchar("note", "16"),
        ];
        let changes = TableChanges::diff(live, &table, &[], &[]);
        assert_eq!(changes.remove_columns.len(), 3);
        let statements = MySqlDialect::new().sync_sql(&table, &changes);
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE `users` MODIFY COLUMN `legacy` VARCHAR(16) CHARACTER SET 'utf8mb4' COLLATE 'utf8mb4_unicode_ci'"
                    .to_string()
            ]
        );
        assert!(!statements[0].contains("DROP COLUMN"));
    }

    #[test]
    fn test_sync_removed_auto_increment_primary() {
        let table = TableSpec::new("events").column(id36());
        let live = vec![col("seq", FieldType::Int64, &[(TAG_AUTOINCREMENT, "true")])];
        let changes = TableChanges::diff(live, &table, &[], &[]);
        let statements = MySqlDialect::new().sync_sql(&table, &changes);
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE `events` DROP PRIMARY KEY, \
                 MODIFY COLUMN `seq` BIGINT, \
                 ADD COLUMN `id` VARCHAR(36) CHARACTER SET 'utf8mb4' COLLATE 'utf8mb4_unicode_ci' NOT NULL, \
                 ADD PRIMARY KEY(`id`)"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_sync_rename_uses_change_column() {
        let table = TableSpec::new("users").column(id36()).column(varchar("full_name", "64"));
        let changes = TableChanges {
            old_columns: vec![id36(), varchar("name", "64")],
            updated_columns: vec![UpdatedColumn::new(
                varchar("name", "64"),
                varchar("full_name", "64"),
            )],
            ..TableChanges::default()
        };
        let statements = MySqlDialect::new().sync_sql(&table, &changes);
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE `users` CHANGE COLUMN `name` `full_name` VARCHAR(64) CHARACTER SET 'utf8mb4' COLLATE 'utf8mb4_unicode_ci'"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_sync_index_ordering() {
        let table = TableSpec::new("users")
            .column(id36())
            .column(varchar("name", "64"))
            .column(varchar("email", "64"))
            .add_index(&["email"], true);
        let live = vec![id36(), varchar("name", "64")];
        let stale = TableIndex::new("ix_users_name", vec!["name".to_string()], false);
        let changes = TableChanges::diff(live, &table, &[stale], &[]);
        let statements = MySqlDialect::new().sync_sql(&table, &changes);
        assert_eq!(statements.len(), 3);
        assert_eq!(statements[0], "DROP INDEX `ix_users_name` ON `users`");
        assert!(statements[1].starts_with("ALTER TABLE `users` ADD COLUMN `email`"));
        assert_eq!(
            statements[2],
            "CREATE UNIQUE INDEX `ix_users_email` ON `users` (`email`)"
        );
    }
}
