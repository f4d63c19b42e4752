//! MySQL table schema synchronization.
//!
//! `oxide-mysql-sync` keeps a live MySQL table in line with a declared one:
//! - Columns are typed [`ColumnKind`](column::ColumnKind)s built from tags
//! - The declared table renders as a `CREATE TABLE` statement
//! - The live table is read back through `SHOW FULL COLUMNS` and
//!   `SHOW CREATE TABLE`
//! - Differences become a single ordered `ALTER TABLE` plus index statements
//!
//! # Architecture
//!
//! - **Column** - Column kinds, their DDL, defaults and value conversions
//! - **Table** - Table specs, indexes and change-set computation
//! - **Dialect** - DDL rendering and the diff applier
//! - **Introspect** - Decoding of live column metadata
//! - **Definition** - Index and foreign key extraction from table definitions
//! - **Executor** - Introspects, plans and applies changes against a database
//!
//! # Example
//!
//! ```rust
//! use oxide_mysql_sync::prelude::*;
//!
//! let table = TableSpec::new("users")
//!     .column(
//!         ColumnKind::for_field(
//!             "id",
//!             FieldType::UInt64,
//!             Tags::new().with(TAG_AUTOINCREMENT, "true"),
//!             false,
//!         )
//!         .unwrap(),
//!     )
//!     .column(
//!         ColumnKind::for_field(
//!             "email",
//!             FieldType::String,
//!             Tags::new().with(TAG_WIDTH, "128").with(TAG_INDEX, "true"),
//!             false,
//!         )
//!         .unwrap(),
//!     );
//!
//! let sql = MySqlDialect::new().create_table_sql(&table);
//! assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS `users`"));
//! assert!(sql.contains("KEY `ix_users_email` (`email`)"));
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Print the DDL of a table declaration
//! oxide-mysql-sync create-sql --spec users.json
//!
//! # Show the live columns of a table
//! oxide-mysql-sync --database mysql://root@localhost/app columns users
//!
//! # Create or synchronize a table, printing the SQL only
//! oxide-mysql-sync --database mysql://root@localhost/app sync --spec users.json --dry-run
//! ```

pub mod column;
pub mod decl;
pub mod definition;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod introspect;
pub mod table;
pub mod tags;
pub mod value;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::column::{
        BooleanColumn, Charset, ColumnBase, ColumnKind, CompoundColumn, DateTimeColumn,
        DecimalColumn, FieldType, FloatColumn, IntegerColumn, TextColumn, TimeType,
        TristateColumn,
    };
    pub use crate::decl::{ColumnDecl, IndexDecl, TableDecl};
    pub use crate::definition::{parse_constraints, parse_indexes};
    pub use crate::dialect::{MySqlDialect, SchemaDialect};
    pub use crate::error::{Result, SyncError};
    pub use crate::executor::{SchemaExecutor, SyncPlan};
    pub use crate::introspect::{decode_sql_type, fetch_live_columns, ShowColumnsRow};
    pub use crate::table::{TableChanges, TableConstraint, TableIndex, TableSpec, UpdatedColumn};
    pub use crate::tags::*;
    pub use crate::value::{ColumnValue, TriState};
}
