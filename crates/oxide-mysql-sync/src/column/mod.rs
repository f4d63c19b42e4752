//! Column kinds.
//!
//! A [`ColumnKind`] is the typed description of one MySQL column: how it is
//! rendered as DDL, how textual defaults are parsed, and which host values
//! count as "zero". Every kind shares a [`ColumnBase`] holding the common
//! attributes (name, nullability, keys, default, leftover tags).

mod boolean;
mod numeric;
mod temporal;
mod text;

pub use boolean::{BooleanColumn, TristateColumn};
pub use numeric::{
    DecimalColumn, FloatColumn, IntegerColumn, default_int_width, INT_WIDTH_DEFAULT,
    UNSIGNED_INT_WIDTH_DEFAULT,
};
pub use temporal::{DateTimeColumn, TimeType};
pub use text::{Charset, CompoundColumn, TextColumn};

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::table::quote_ident;
use crate::tags::{self, Tags};
use crate::value::{ColumnValue, TriState};

/// Attributes shared by every column kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBase {
    name: String,
    db_name: Option<String>,
    sql_type: String,
    default: Option<String>,
    pointer: bool,
    nullable: bool,
    primary: bool,
    unique: bool,
    index: bool,
    allow_zero: bool,
    tags: Tags,
}

impl ColumnBase {
    /// Builds the common attributes, popping the generic tags.
    ///
    /// Columns are nullable unless tagged otherwise; primary columns are
    /// never nullable.
    pub(crate) fn new(name: &str, sql_type: &str, mut tags: Tags, pointer: bool) -> Self {
        let db_name = tags.pop(tags::TAG_NAME).filter(|n| !n.is_empty());
        let default = tags.pop(tags::TAG_DEFAULT).filter(|d| !d.is_empty());
        let mut nullable = tags.pop_bool(tags::TAG_NULLABLE).unwrap_or(true);
        let primary = tags.pop_bool(tags::TAG_PRIMARY).unwrap_or(false);
        let unique = tags.pop_bool(tags::TAG_UNIQUE).unwrap_or(false);
        let index = tags.pop_bool(tags::TAG_INDEX).unwrap_or(false);
        let allow_zero = tags.pop_bool(tags::TAG_ALLOW_ZERO).unwrap_or(false);
        if primary {
            nullable = false;
        }
        Self {
            name: name.to_string(),
            db_name,
            sql_type: sql_type.to_string(),
            default,
            pointer,
            nullable,
            primary,
            unique,
            index,
            allow_zero,
            tags,
        }
    }

    /// Database name of the column.
    #[must_use]
    pub fn name(&self) -> &str {
        self.db_name.as_deref().unwrap_or(&self.name)
    }

    /// Base SQL type keyword, e.g. `VARCHAR`.
    #[must_use]
    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }

    /// Default value as declared.
    #[must_use]
    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Tags no constructor consumed.
    #[must_use]
    pub fn tags(&self) -> &Tags {
        &self.tags
    }
}

/// Reads and removes the `width` tag. A zero width means "no width".
pub(crate) fn pop_width(column: &str, tags: &mut Tags) -> Result<Option<u32>> {
    let Some(raw) = tags.pop(tags::TAG_WIDTH) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u32>()
        .map(|w| (w > 0).then_some(w))
        .map_err(|_| SyncError::InvalidTagValue {
            column: column.to_string(),
            tag: tags::TAG_WIDTH.to_string(),
            value: raw,
        })
}

/// Formats `TYPE(width)` or bare `TYPE`.
pub(crate) fn with_width(sql_type: &str, width: Option<u32>) -> String {
    match width {
        Some(w) => format!("{sql_type}({w})"),
        None => sql_type.to_string(),
    }
}

/// A MySQL column, one variant per column category.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    /// `TINYINT(1)` holding true/false.
    Boolean(BooleanColumn),
    /// `TINYINT(1)` holding true/false/NULL.
    Tristate(TristateColumn),
    /// Integer family.
    Integer(IntegerColumn),
    /// `FLOAT` or `DOUBLE`.
    Float(FloatColumn),
    /// `DECIMAL(width, precision)`.
    Decimal(DecimalColumn),
    /// `VARCHAR` or the `TEXT` family.
    Text(TextColumn),
    /// `DATETIME`, `DATE` or `TIMESTAMP`.
    DateTime(DateTimeColumn),
    /// Structured value stored as text.
    Compound(CompoundColumn),
}

impl ColumnKind {
    /// Builds the column for a declared host field type.
    pub fn for_field(
        name: &str,
        field_type: FieldType,
        tags: Tags,
        pointer: bool,
    ) -> Result<Self> {
        let int = |sql_type: &str, unsigned: bool, tags: Tags| {
            IntegerColumn::new(name, sql_type, unsigned, tags, pointer).map(Self::Integer)
        };
        let time = |time_type: TimeType, tags: Tags| {
            Self::DateTime(DateTimeColumn::new(name, time_type, tags, pointer))
        };
        let column = match field_type {
            FieldType::Bool => Self::Boolean(BooleanColumn::new(name, tags, pointer)?),
            FieldType::TriState => Self::Tristate(TristateColumn::new(name, tags, pointer)?),
            FieldType::Int8 => int("TINYINT", false, tags)?,
            FieldType::Int16 => int("SMALLINT", false, tags)?,
            FieldType::Int32 => int("INT", false, tags)?,
            FieldType::Int64 => int("BIGINT", false, tags)?,
            FieldType::UInt8 => int("TINYINT", true, tags)?,
            FieldType::UInt16 => int("SMALLINT", true, tags)?,
            FieldType::UInt32 => int("INT", true, tags)?,
            FieldType::UInt64 => int("BIGINT", true, tags)?,
            FieldType::Float32 => Self::Float(FloatColumn::new(name, "FLOAT", tags, pointer)?),
            FieldType::Float64 => Self::Float(FloatColumn::new(name, "DOUBLE", tags, pointer)?),
            FieldType::Decimal => Self::Decimal(DecimalColumn::new(name, tags, pointer)?),
            FieldType::String => Self::Text(TextColumn::new(name, tags, pointer)?),
            FieldType::DateTime => time(TimeType::DateTime, tags),
            FieldType::Date => time(TimeType::Date, tags),
            FieldType::Timestamp => time(TimeType::Timestamp, tags),
            FieldType::Json => Self::Compound(CompoundColumn::new(name, tags, pointer)?),
        };
        Ok(column)
    }

    /// Shared attributes.
    #[must_use]
    pub fn base(&self) -> &ColumnBase {
        match self {
            Self::Boolean(c) => &c.base,
            Self::Tristate(c) => &c.base,
            Self::Integer(c) => &c.base,
            Self::Float(c) => &c.base,
            Self::Decimal(c) => &c.base,
            Self::Text(c) => &c.base,
            Self::DateTime(c) => &c.base,
            Self::Compound(c) => &c.text.base,
        }
    }

    fn base_mut(&mut self) -> &mut ColumnBase {
        match self {
            Self::Boolean(c) => &mut c.base,
            Self::Tristate(c) => &mut c.base,
            Self::Integer(c) => &mut c.base,
            Self::Float(c) => &mut c.base,
            Self::Decimal(c) => &mut c.base,
            Self::Text(c) => &mut c.base,
            Self::DateTime(c) => &mut c.base,
            Self::Compound(c) => &mut c.text.base,
        }
    }

    /// Database name of the column.
    #[must_use]
    pub fn name(&self) -> &str {
        self.base().name()
    }

    /// Full SQL type clause, including width, precision, sign and charset.
    #[must_use]
    pub fn col_type(&self) -> String {
        match self {
            Self::Boolean(c) => c.col_type(),
            Self::Tristate(c) => c.col_type(),
            Self::Integer(c) => c.col_type(),
            Self::Float(c) => c.base.sql_type.clone(),
            Self::Decimal(c) => c.col_type(),
            Self::Text(c) => c.col_type(),
            Self::DateTime(c) => c.base.sql_type.clone(),
            Self::Compound(c) => c.text.col_type(),
        }
    }

    /// Default value as declared, if any.
    #[must_use]
    pub fn default(&self) -> Option<&str> {
        self.base().default()
    }

    /// Replaces the declared default.
    pub fn set_default(&mut self, default: Option<String>) {
        self.base_mut().default = default.filter(|d| !d.is_empty());
    }

    /// Whether the type accepts a DDL default. MySQL rejects defaults on
    /// TEXT and BLOB columns.
    #[must_use]
    pub fn is_support_default(&self) -> bool {
        match self {
            Self::Text(c) => c.is_varchar(),
            Self::Compound(c) => c.text.is_varchar(),
            _ => true,
        }
    }

    /// Whether the column accepts NULL.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.base().nullable
    }

    /// Sets nullability.
    pub fn set_nullable(&mut self, on: bool) {
        self.base_mut().nullable = on;
    }

    /// Whether the column is part of the primary key.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.base().primary
    }

    /// Whether values are unique per row.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.base().unique
    }

    /// Whether a single-column index is created for this column.
    #[must_use]
    pub fn is_index(&self) -> bool {
        self.base().index
    }

    /// Whether the host field is optional.
    #[must_use]
    pub fn is_pointer(&self) -> bool {
        self.base().pointer
    }

    /// Whether zero values are written rather than omitted.
    #[must_use]
    pub fn allow_zero(&self) -> bool {
        self.base().allow_zero
    }

    /// Tags no constructor consumed.
    #[must_use]
    pub fn tags(&self) -> &Tags {
        self.base().tags()
    }

    /// Attributes rendered after the default, e.g. `AUTO_INCREMENT`.
    #[must_use]
    pub fn extra_defs(&self) -> Option<&'static str> {
        match self {
            Self::Integer(c) if c.auto_increment => Some("AUTO_INCREMENT"),
            _ => None,
        }
    }

    /// Whether values are written as quoted literals.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_) | Self::DateTime(_) | Self::Compound(_))
    }

    /// Whether the host value is a string.
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::Text(_) | Self::Compound(_))
    }

    /// Whether the column supports text search.
    #[must_use]
    pub fn is_searchable(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Whether the column stores ASCII text.
    #[must_use]
    pub fn is_ascii(&self) -> bool {
        match self {
            Self::Text(c) => c.charset == Charset::Ascii,
            Self::Compound(c) => c.text.charset == Charset::Ascii,
            _ => false,
        }
    }

    /// Whether the column is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_) | Self::Decimal(_))
    }

    /// Whether this is an auto-increment integer.
    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        matches!(self, Self::Integer(c) if c.auto_increment)
    }

    /// Whether this is a row version counter.
    #[must_use]
    pub fn is_auto_version(&self) -> bool {
        matches!(self, Self::Integer(c) if c.auto_version)
    }

    /// Parses a textual value into this column's native representation.
    #[must_use]
    pub fn convert_from_string(&self, s: &str) -> ColumnValue {
        match self {
            Self::Boolean(_) => ColumnValue::Bool(tags::to_bool(s)),
            Self::Tristate(_) => ColumnValue::TriState(TriState::parse(s)),
            Self::Integer(c) => c.convert_from_string(s),
            Self::Float(_) | Self::Decimal(_) => s
                .trim()
                .parse::<f64>()
                .map_or_else(|_| ColumnValue::Text(s.to_string()), ColumnValue::Float),
            Self::Text(_) => ColumnValue::Text(s.to_string()),
            Self::DateTime(c) => c.convert_from_string(s),
            Self::Compound(_) => CompoundColumn::decode(s)
                .map_or_else(|_| ColumnValue::Text(s.to_string()), ColumnValue::Compound),
        }
    }

    /// Maps a host value to the value bound as a SQL parameter.
    #[must_use]
    pub fn convert_from_value(&self, value: &ColumnValue) -> ColumnValue {
        match (self, value) {
            (_, ColumnValue::Null) => ColumnValue::Null,
            (Self::Boolean(_), ColumnValue::Bool(b)) => ColumnValue::Int(i64::from(*b)),
            (Self::Boolean(_), ColumnValue::Int(i)) => ColumnValue::Int(i64::from(*i != 0)),
            (Self::Boolean(_), ColumnValue::Text(s)) => {
                ColumnValue::Int(i64::from(tags::to_bool(s)))
            }
            (Self::Tristate(_), ColumnValue::TriState(t)) => tristate_param(*t),
            (Self::Tristate(_), ColumnValue::Bool(b)) => tristate_param(TriState::from(*b)),
            (Self::Tristate(_), ColumnValue::Text(s)) => tristate_param(TriState::parse(s)),
            (Self::Compound(_), ColumnValue::Compound(v)) => {
                ColumnValue::Text(CompoundColumn::encode(v))
            }
            _ => value.clone(),
        }
    }

    /// Whether `value` is the zero value of this column. Nil is always zero;
    /// a non-nil value of a pointer column never is.
    #[must_use]
    pub fn is_zero(&self, value: &ColumnValue) -> bool {
        if value.is_null() {
            return true;
        }
        if self.is_pointer() {
            return false;
        }
        match (self, value) {
            (Self::Boolean(_), ColumnValue::Bool(b)) => !b,
            (Self::Boolean(_), ColumnValue::Text(s)) => !tags::to_bool(s),
            (Self::Tristate(_), ColumnValue::TriState(t)) => *t == TriState::None,
            (Self::Tristate(_), ColumnValue::Text(s)) => TriState::parse(s) == TriState::None,
            (
                Self::Boolean(_) | Self::Integer(_) | Self::Float(_) | Self::Decimal(_),
                ColumnValue::Int(i),
            ) => *i == 0,
            (Self::Integer(_) | Self::Float(_) | Self::Decimal(_), ColumnValue::UInt(u)) => {
                *u == 0
            }
            (Self::Float(_) | Self::Decimal(_), ColumnValue::Float(f)) => *f == 0.0,
            (Self::Text(_), ColumnValue::Text(s)) => s.is_empty(),
            (Self::DateTime(_), ColumnValue::Time(t)) => *t == DateTime::<Utc>::default(),
            // A set value of any other shape is never the zero value.
            _ => false,
        }
    }

    /// The rendered `DEFAULT` literal, if one applies.
    #[must_use]
    pub fn default_literal(&self) -> Option<String> {
        let default = self.default()?;
        if !self.is_support_default() {
            return None;
        }
        if matches!(self, Self::DateTime(_)) && temporal::is_time_expression(default) {
            return Some(default.trim().to_ascii_uppercase());
        }
        let value = self.convert_from_string(default);
        Some(match (self.is_text(), &value) {
            (true, ColumnValue::Text(s)) => crate::value::quote_literal(s),
            (false, ColumnValue::Text(s)) => s.clone(),
            _ => value.to_sql_literal(),
        })
    }

    /// The column clause of a CREATE/ALTER statement:
    /// `` `name` TYPE [NOT NULL] [DEFAULT ...] [EXTRA] ``.
    #[must_use]
    pub fn definition_string(&self) -> String {
        let mut sql = format!("{} {}", quote_ident(self.name()), self.col_type());
        if !self.is_nullable() {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = self.default_literal() {
            let _ = write!(sql, " DEFAULT {default}");
        }
        if let Some(extra) = self.extra_defs() {
            sql.push(' ');
            sql.push_str(extra);
        }
        sql
    }

    /// The definition with integer display widths filled from the dialect
    /// defaults, so that `INT` and `INT(11)` compare equal.
    #[must_use]
    pub fn normalized_definition(&self) -> String {
        match self {
            Self::Integer(c) if c.width.is_none() => {
                let mut filled = self.clone();
                if let Self::Integer(f) = &mut filled {
                    f.width = default_int_width(&c.base.sql_type, c.unsigned);
                }
                filled.definition_string()
            }
            _ => self.definition_string(),
        }
    }

    /// Whether two columns produce the same DDL up to dialect normalization.
    #[must_use]
    pub fn same_definition(&self, other: &Self) -> bool {
        self.normalized_definition() == other.normalized_definition()
    }

    /// Turns off auto-increment, leaving the column a plain nullable integer.
    /// Has no effect on other kinds.
    pub fn clear_auto_increment(&mut self) {
        if let Self::Integer(c) = self {
            if c.auto_increment {
                c.auto_increment = false;
                c.auto_increment_offset = 0;
                c.base.nullable = true;
            }
        }
    }
}

fn tristate_param(t: TriState) -> ColumnValue {
    match t {
        TriState::True => ColumnValue::Int(1),
        TriState::False => ColumnValue::Int(0),
        TriState::None => ColumnValue::Null,
    }
}

/// Host field types a column can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// `bool`.
    Bool,
    /// Three-valued boolean.
    TriState,
    /// `i8`.
    Int8,
    /// `i16`.
    Int16,
    /// `i32`.
    Int32,
    /// `i64`.
    Int64,
    /// `u8`.
    UInt8,
    /// `u16`.
    UInt16,
    /// `u32`.
    UInt32,
    /// `u64`.
    UInt64,
    /// `f32`.
    Float32,
    /// `f64`.
    Float64,
    /// Fixed point number.
    Decimal,
    /// String.
    String,
    /// Date and time.
    DateTime,
    /// Date only.
    Date,
    /// Timestamp.
    Timestamp,
    /// JSON-encoded structure.
    Json,
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_ascii_lowercase()))
            .map_err(|_| s.to_string())
    }
}
