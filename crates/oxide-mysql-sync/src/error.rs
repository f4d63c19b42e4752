//! Error types for schema rendering, introspection and synchronization.

use std::path::PathBuf;

/// Errors that can occur while building, introspecting or syncing a table.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A DECIMAL column was declared without a precision tag.
    #[error("Column '{column}' of type DECIMAL misses the precision tag")]
    MissingPrecision {
        /// The offending column.
        column: String,
    },

    /// A tag carried a value that cannot be interpreted.
    #[error("Column '{column}': invalid value '{value}' for tag '{tag}'")]
    InvalidTagValue {
        /// The offending column.
        column: String,
        /// Tag name.
        tag: String,
        /// The raw tag value.
        value: String,
    },

    /// A text column asked for a charset other than `ascii` or `utf8`.
    #[error("Unsupported charset '{charset}' for column '{column}'")]
    UnsupportedCharset {
        /// The offending column.
        column: String,
        /// The requested charset.
        charset: String,
    },

    /// A non-pointer boolean column declared a true default.
    #[error("Non-pointer boolean column '{0}' should not default to true")]
    BooleanDefaultTrue(String),

    /// A SQL type that has no column kind counterpart.
    #[error("Unsupported SQL type '{sql_type}' for column '{column}'")]
    UnsupportedType {
        /// The offending column.
        column: String,
        /// The raw SQL type.
        sql_type: String,
    },

    /// A field type name in a table declaration is unknown.
    #[error("Unknown field type '{field_type}' for column '{column}'")]
    UnknownFieldType {
        /// The offending column.
        column: String,
        /// The field type as written in the declaration.
        field_type: String,
    },

    /// A table definition or introspected row is malformed.
    #[error("Invalid definition of table '{table}': {message}")]
    InvalidDefinition {
        /// Table name.
        table: String,
        /// What is wrong.
        message: String,
    },

    /// Failed to read a table declaration file.
    #[error("Failed to load table declaration '{path}': {source}")]
    Load {
        /// Path to the declaration file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Database error while introspecting or executing statements.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Multiple errors occurred.
    #[error("Multiple errors occurred:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Multiple(Vec<SyncError>),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
