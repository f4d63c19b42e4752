//! Host-side column values.
//!
//! [`ColumnValue`] is what the ORM hands to a column for zero-value checks
//! and parameter conversion, and what textual defaults are parsed into.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A three-valued boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TriState {
    /// Known true.
    True,
    /// Known false.
    False,
    /// Unknown.
    #[default]
    None,
}

impl TriState {
    /// Parses a textual tristate. `none`, `null` and `unknown` are
    /// [`TriState::None`], the boolean truthy words are [`TriState::True`],
    /// everything else is [`TriState::False`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "ok" | "1" => Self::True,
            "none" | "null" | "unknown" => Self::None,
            _ => Self::False,
        }
    }
}

impl From<bool> for TriState {
    fn from(b: bool) -> Self {
        if b { Self::True } else { Self::False }
    }
}

impl From<Option<bool>> for TriState {
    fn from(b: Option<bool>) -> Self {
        b.map_or(Self::None, Self::from)
    }
}

/// A value as seen by a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// SQL NULL, or a nil pointer on the host side.
    Null,
    /// Boolean.
    Bool(bool),
    /// Three-valued boolean.
    TriState(TriState),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point.
    Float(f64),
    /// Text.
    Text(String),
    /// Point in time.
    Time(DateTime<Utc>),
    /// Structured value stored as JSON text.
    Compound(serde_json::Value),
}

impl ColumnValue {
    /// Returns whether this is [`ColumnValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the value as a SQL literal.
    #[must_use]
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Self::TriState(TriState::True) => "1".to_string(),
            Self::TriState(TriState::False) => "0".to_string(),
            Self::TriState(TriState::None) => "NULL".to_string(),
            Self::Int(i) => i.to_string(),
            Self::UInt(u) => u.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => quote_literal(s),
            Self::Time(t) => quote_literal(&t.format("%Y-%m-%d %H:%M:%S").to_string()),
            Self::Compound(v) => quote_literal(&v.to_string()),
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_literal())
    }
}

/// Single-quotes a string literal, doubling embedded quotes.
#[must_use]
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Parses the time formats MySQL reports and accepts.
pub(crate) fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tristate_parse() {
        assert_eq!(TriState::parse("TRUE"), TriState::True);
        assert_eq!(TriState::parse("ok"), TriState::True);
        assert_eq!(TriState::parse("null"), TriState::None);
        assert_eq!(TriState::parse("Unknown"), TriState::None);
        assert_eq!(TriState::parse("none"), TriState::None);
        assert_eq!(TriState::parse("no"), TriState::False);
        assert_eq!(TriState::from(Some(true)), TriState::True);
        assert_eq!(TriState::from(None), TriState::None);
    }

    #[test]
    fn test_sql_literals() {
        assert_eq!(ColumnValue::Null.to_sql_literal(), "NULL");
        assert_eq!(ColumnValue::Bool(true).to_sql_literal(), "1");
        assert_eq!(ColumnValue::TriState(TriState::None).to_sql_literal(), "NULL");
        assert_eq!(ColumnValue::Int(-3).to_sql_literal(), "-3");
        assert_eq!(ColumnValue::Float(1.5).to_sql_literal(), "1.5");
        assert_eq!(
            ColumnValue::Text("it's".to_string()).to_sql_literal(),
            "'it''s'"
        );
        assert_eq!(
            ColumnValue::Compound(serde_json::json!({"a": 1})).to_sql_literal(),
            r#"'{"a":1}'"#
        );
    }

    #[test]
    fn test_parse_time() {
        let t = parse_time("2024-03-01 12:30:00").unwrap();
        assert_eq!(
            ColumnValue::Time(t).to_sql_literal(),
            "'2024-03-01 12:30:00'"
        );
        assert!(parse_time("2024-03-01").is_some());
        assert!(parse_time("2024-03-01T12:30:00Z").is_some());
        assert!(parse_time("CURRENT_TIMESTAMP").is_none());
    }
}
