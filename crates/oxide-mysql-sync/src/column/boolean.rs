//! Boolean and tristate columns.

use tracing::warn;

use super::{ColumnBase, pop_width, with_width};
use crate::error::{Result, SyncError};
use crate::tags::{self, Tags};

/// A boolean stored as `TINYINT(1)`, true and false being 1 and 0.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanColumn {
    pub(crate) base: ColumnBase,
    width: u32,
}

impl BooleanColumn {
    /// Creates a boolean column.
    ///
    /// A non-pointer boolean defaulting to true would hide a missing value
    /// behind the default, so it is rejected.
    pub fn new(name: &str, mut tags: Tags, pointer: bool) -> Result<Self> {
        let width = pop_width(name, &mut tags)?.unwrap_or(1);
        let base = ColumnBase::new(name, "TINYINT", tags, pointer);
        if !pointer && base.default().is_some_and(tags::to_bool) {
            return Err(SyncError::BooleanDefaultTrue(name.to_string()));
        }
        Ok(Self { base, width })
    }

    pub(crate) fn col_type(&self) -> String {
        with_width(&self.base.sql_type, Some(self.width))
    }
}

/// A three-valued boolean stored as a nullable `TINYINT(1)`: 1, 0 or NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct TristateColumn {
    pub(crate) base: ColumnBase,
}

impl TristateColumn {
    /// Creates a tristate column. Tristates are always nullable; an explicit
    /// `nullable` tag is ignored with a warning.
    pub fn new(name: &str, mut tags: Tags, pointer: bool) -> Result<Self> {
        if let Some(value) = tags.pop(tags::TAG_NULLABLE) {
            warn!(
                column = %name,
                nullable = %value,
                "Tristate column is always nullable, ignoring nullable tag"
            );
        }
        // Display width is fixed.
        pop_width(name, &mut tags)?;
        let mut base = ColumnBase::new(name, "TINYINT", tags, pointer);
        base.nullable = true;
        Ok(Self { base })
    }

    pub(crate) fn col_type(&self) -> String {
        with_width(&self.base.sql_type, Some(1))
    }
}
