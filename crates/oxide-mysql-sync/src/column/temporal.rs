//! Date and time columns.

use super::ColumnBase;
use crate::tags::{self, Tags};
use crate::value::{self, ColumnValue};

/// Which temporal type a [`DateTimeColumn`] stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeType {
    /// `DATETIME`.
    DateTime,
    /// `DATE`.
    Date,
    /// `TIMESTAMP`.
    Timestamp,
}

impl TimeType {
    /// SQL type keyword.
    #[must_use]
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::DateTime => "DATETIME",
            Self::Date => "DATE",
            Self::Timestamp => "TIMESTAMP",
        }
    }
}

/// A `DATETIME`, `DATE` or `TIMESTAMP` column.
#[derive(Debug, Clone, PartialEq)]
pub struct DateTimeColumn {
    pub(crate) base: ColumnBase,
    time_type: TimeType,
    created_at: bool,
    updated_at: bool,
}

impl DateTimeColumn {
    /// Creates a temporal column. The `created_at` and `updated_at` tags
    /// mark columns the ORM fills on insert and update.
    #[must_use]
    pub fn new(name: &str, time_type: TimeType, mut tags: Tags, pointer: bool) -> Self {
        let created_at = tags.pop_bool(tags::TAG_CREATE_TIMESTAMP).unwrap_or(false);
        let updated_at = tags.pop_bool(tags::TAG_UPDATE_TIMESTAMP).unwrap_or(false);
        Self {
            base: ColumnBase::new(name, time_type.sql_type(), tags, pointer),
            time_type,
            created_at,
            updated_at,
        }
    }

    /// The stored temporal type.
    #[must_use]
    pub fn time_type(&self) -> TimeType {
        self.time_type
    }

    /// Whether the column records the creation time.
    #[must_use]
    pub fn is_created_at(&self) -> bool {
        self.created_at
    }

    /// Whether the column records the last update time.
    #[must_use]
    pub fn is_updated_at(&self) -> bool {
        self.updated_at
    }

    pub(crate) fn convert_from_string(&self, s: &str) -> ColumnValue {
        value::parse_time(s).map_or_else(|| ColumnValue::Text(s.to_string()), ColumnValue::Time)
    }
}

/// Whether a default is a server-side time expression rather than a literal.
pub(crate) fn is_time_expression(s: &str) -> bool {
    let upper = s.trim().to_ascii_uppercase();
    if upper == "NOW()" || upper == "CURRENT_TIMESTAMP" {
        return true;
    }
    upper
        .strip_prefix("CURRENT_TIMESTAMP(")
        .and_then(|rest| rest.strip_suffix(')'))
        .is_some_and(|digits| digits.is_empty() || digits.bytes().all(|b| b.is_ascii_digit()))
}
