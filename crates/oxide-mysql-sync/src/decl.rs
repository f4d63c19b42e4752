//! Table declaration files.
//!
//! A declaration is a JSON document describing a table the way a host
//! model would declare it:
//!
//! ```json
//! {
//!   "name": "users",
//!   "columns": [
//!     { "name": "id", "type": "uint64", "tags": { "auto_increment": "true" } },
//!     { "name": "email", "type": "string", "tags": { "width": "128", "index": "true" } },
//!     { "name": "deleted_at", "type": "datetime", "pointer": true }
//!   ],
//!   "indexes": [ { "columns": ["email", "id"], "unique": true } ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::column::{ColumnKind, FieldType};
use crate::error::{Result, SyncError};
use crate::table::{TableIndex, TableSpec};
use crate::tags::Tags;

/// A declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDecl {
    /// Field name.
    pub name: String,
    /// Host field type, e.g. `int64` or `string`.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Whether the host field is optional.
    #[serde(default)]
    pub pointer: bool,
    /// Column tags.
    #[serde(default)]
    pub tags: Tags,
}

/// A declared table-level index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDecl {
    /// Index name; defaults to `ix_<table>_<cols>`.
    #[serde(default)]
    pub name: Option<String>,
    /// Indexed columns.
    pub columns: Vec<String>,
    /// Whether the index is unique.
    #[serde(default)]
    pub unique: bool,
}

/// A declared table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDecl {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDecl>,
    /// Table-level indexes.
    #[serde(default)]
    pub indexes: Vec<IndexDecl>,
}

impl TableDecl {
    /// Parses a declaration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a declaration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SyncError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Builds the table spec, constructing every column.
    ///
    /// All column errors are collected; a single failure is returned as is,
    /// several as [`SyncError::Multiple`].
    pub fn into_spec(self) -> Result<TableSpec> {
        let mut spec = TableSpec::new(self.name.as_str());
        let mut errors = Vec::new();

        for column in self.columns {
            let built = column
                .field_type
                .parse::<FieldType>()
                .map_err(|field_type| SyncError::UnknownFieldType {
                    column: column.name.clone(),
                    field_type,
                })
                .and_then(|field_type| {
                    ColumnKind::for_field(&column.name, field_type, column.tags, column.pointer)
                });
            match built {
                Ok(kind) => spec = spec.column(kind),
                Err(e) => errors.push(e),
            }
        }

        for index in self.indexes {
            if let Some(missing) = index
                .columns
                .iter()
                .find(|c| spec.get_column(c.as_str()).is_none())
            {
                errors.push(SyncError::InvalidDefinition {
                    table: self.name.clone(),
                    message: format!("index references unknown column '{missing}'"),
                });
                continue;
            }
            let index = match index.name {
                Some(name) => TableIndex::new(name, index.columns, index.unique),
                None => TableIndex::for_table(&self.name, index.columns, index.unique),
            };
            spec = spec.index(index);
        }

        match errors.len() {
            0 => Ok(spec),
            1 => Err(errors.remove(0)),
            _ => Err(SyncError::Multiple(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS: &str = r#"{
        "name": "users",
        "columns": [
            { "name": "id", "type": "uint64", "tags": { "auto_increment": "true" } },
            { "name": "email", "type": "string", "tags": { "width": "128", "index": "true" } },
            { "name": "deleted_at", "type": "datetime", "pointer": true }
        ],
        "indexes": [ { "columns": ["email", "id"], "unique": true } ]
    }"#;

    #[test]
    fn test_into_spec() {
        let spec = TableDecl::from_json(USERS).unwrap().into_spec().unwrap();
        assert_eq!(spec.name(), "users");
        assert_eq!(spec.columns().len(), 3);
        assert!(spec.columns()[0].is_auto_increment());
        assert!(spec.columns()[2].is_pointer());
        assert_eq!(spec.indexes().len(), 1);
        assert_eq!(spec.indexes()[0].name(), "ix_users_email_id");
        assert_eq!(spec.all_indexes().len(), 2);
    }

    #[test]
    fn test_unknown_field_type() {
        let decl = TableDecl::from_json(
            r#"{"name": "t", "columns": [{"name": "data", "type": "blob"}]}"#,
        )
        .unwrap();
        let err = decl.into_spec().unwrap_err();
        assert!(matches!(
            err,
            SyncError::UnknownFieldType { ref field_type, .. } if field_type == "blob"
        ));
    }

    #[test]
    fn test_errors_are_collected() {
        let decl = TableDecl::from_json(
            r#"{"name": "t", "columns": [
                {"name": "price", "type": "decimal"},
                {"name": "flag", "type": "bool", "tags": {"default": "true"}}
            ], "indexes": [{"columns": ["missing"]}]}"#,
        )
        .unwrap();
        let err = decl.into_spec().unwrap_err();
        let SyncError::Multiple(errors) = err else {
            panic!("expected multiple errors, got {err:?}");
        };
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], SyncError::MissingPrecision { .. }));
        assert!(matches!(errors[1], SyncError::BooleanDefaultTrue(_)));
        assert!(matches!(errors[2], SyncError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            TableDecl::from_json("{"),
            Err(SyncError::Serialization(_))
        ));
    }
}
