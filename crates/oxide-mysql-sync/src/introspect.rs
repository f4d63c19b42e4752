//! Live schema introspection.
//!
//! `SHOW FULL COLUMNS` rows are decoded back into [`ColumnKind`]s, the
//! reverse of [`ColumnKind::definition_string`]. Rows whose type has no
//! column kind are logged and left out of the live view.

use std::sync::LazyLock;

use regex::Regex;
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::Row;
use tracing::{debug, error};

use crate::column::{
    default_int_width, BooleanColumn, Charset, ColumnKind, DateTimeColumn, DecimalColumn,
    FloatColumn, IntegerColumn, TextColumn, TimeType,
};
use crate::error::{Result, SyncError};
use crate::table::quote_ident;
use crate::tags::{self, Tags};
use crate::value::{ColumnValue, TriState};

static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)\((\d+)(?:,\s*(\d+))?\)").expect("type pattern is valid")
});

static ENUM_LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'((?:[^']|'')*)'").expect("enum literal pattern is valid"));

/// A raw type string such as `int(10) unsigned`, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTypeInfo {
    /// Upper-case base keyword, e.g. `INT`.
    pub base: String,
    /// First parenthesized number.
    pub width: Option<u32>,
    /// Second parenthesized number.
    pub precision: Option<u32>,
    /// Whether the type carries the `unsigned` attribute.
    pub unsigned: bool,
}

/// Decodes a raw MySQL type. `WORD(DIGITS[, DIGITS])` yields a width and
/// precision; anything else keeps only the leading keyword.
#[must_use]
pub fn decode_sql_type(raw: &str) -> SqlTypeInfo {
    let raw = raw.trim();
    let unsigned = raw.to_ascii_lowercase().contains(" unsigned");
    if let Some(caps) = TYPE_RE.captures(raw) {
        return SqlTypeInfo {
            base: caps[1].to_ascii_uppercase(),
            width: caps.get(2).and_then(|m| m.as_str().parse().ok()),
            precision: caps.get(3).and_then(|m| m.as_str().parse().ok()),
            unsigned,
        };
    }
    let base: String = raw
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    SqlTypeInfo {
        base: base.to_ascii_uppercase(),
        width: None,
        precision: None,
        unsigned,
    }
}

/// The literals of an `enum('a','b')` type, with doubled quotes unescaped.
#[must_use]
pub fn enum_literals(raw: &str) -> Vec<String> {
    ENUM_LITERAL_RE
        .captures_iter(raw)
        .map(|caps| caps[1].replace("''", "'"))
        .collect()
}

/// Width of the `VARCHAR` an enum collapses to: the smallest power of two
/// that fits the longest literal.
fn enum_width(literals: &[String]) -> u32 {
    let longest = literals.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    u32::try_from(longest.next_power_of_two()).unwrap_or(u32::MAX)
}

/// One row of `SHOW FULL COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShowColumnsRow {
    /// Column name.
    pub field: String,
    /// Raw type, e.g. `varchar(128)`.
    pub sql_type: String,
    /// Collation of text columns.
    pub collation: Option<String>,
    /// `YES` or `NO`.
    pub null: String,
    /// `PRI`, `UNI`, `MUL` or empty.
    pub key: String,
    /// Default value, `None` for NULL.
    pub default: Option<String>,
    /// Extra attributes, e.g. `auto_increment`.
    pub extra: String,
    /// Privileges of the current user.
    pub privileges: String,
    /// Column comment.
    pub comment: String,
}

impl ShowColumnsRow {
    /// Decodes the row into a column kind.
    pub fn to_column(&self) -> Result<ColumnKind> {
        let info = decode_sql_type(&self.sql_type);
        let name = self.field.as_str();
        let mut tags = Tags::new();
        if self.null.eq_ignore_ascii_case("NO") {
            tags.insert(tags::TAG_NULLABLE, "false");
        }
        if self.key == "PRI" {
            tags.insert(tags::TAG_PRIMARY, "true");
        }
        if let Some(default) = &self.default {
            tags.insert(tags::TAG_DEFAULT, default.as_str());
        }
        let charset = Charset::from_collation(self.collation.as_deref().unwrap_or_default());
        let base = info.base.as_str();

        let column = if base.ends_with("CHAR") {
            tags.insert(tags::TAG_CHARSET, charset.tag_value());
            if let Some(width) = info.width {
                tags.insert(tags::TAG_WIDTH, width.to_string());
            }
            ColumnKind::Text(TextColumn::new(name, tags, false)?)
        } else if let Some(length) = base.strip_suffix("TEXT") {
            tags.insert(tags::TAG_CHARSET, charset.tag_value());
            if !length.is_empty() {
                tags.insert(tags::TAG_TEXT_LENGTH, length.to_ascii_lowercase());
            }
            ColumnKind::Text(TextColumn::new(name, tags, false)?)
        } else if base == "ENUM" {
            let width = enum_width(&enum_literals(&self.sql_type));
            tags.insert(tags::TAG_CHARSET, charset.tag_value());
            tags.insert(tags::TAG_WIDTH, width.to_string());
            ColumnKind::Text(TextColumn::new(name, tags, false)?)
        } else if base == "TINYINT" && info.width == Some(1) {
            // A true default is only legal on an optional boolean.
            let pointer = self.default.as_deref().is_some_and(tags::to_bool);
            ColumnKind::Boolean(BooleanColumn::new(name, tags, pointer)?)
        } else if base.ends_with("INT") {
            let width = info.width.or_else(|| default_int_width(base, info.unsigned));
            if let Some(width) = width {
                tags.insert(tags::TAG_WIDTH, width.to_string());
            }
            if self.extra.to_ascii_lowercase().contains("auto_increment") {
                tags.insert(tags::TAG_AUTOINCREMENT, "true");
            }
            ColumnKind::Integer(IntegerColumn::new(name, base, info.unsigned, tags, false)?)
        } else if base == "FLOAT" || base == "DOUBLE" {
            ColumnKind::Float(FloatColumn::new(name, base, tags, false)?)
        } else if base == "DECIMAL" {
            if let Some(width) = info.width {
                tags.insert(tags::TAG_WIDTH, width.to_string());
            }
            if let Some(precision) = info.precision {
                tags.insert(tags::TAG_PRECISION, precision.to_string());
            }
            ColumnKind::Decimal(DecimalColumn::new(name, tags, false)?)
        } else if base == "DATETIME" {
            ColumnKind::DateTime(DateTimeColumn::new(name, TimeType::DateTime, tags, false))
        } else if base == "DATE" {
            ColumnKind::DateTime(DateTimeColumn::new(name, TimeType::Date, tags, false))
        } else if base == "TIMESTAMP" {
            ColumnKind::DateTime(DateTimeColumn::new(name, TimeType::Timestamp, tags, false))
        } else {
            return Err(SyncError::UnsupportedType {
                column: name.to_string(),
                sql_type: self.sql_type.clone(),
            });
        };
        Ok(column)
    }

    /// Builds the row MySQL reports for a column created from `column`.
    #[must_use]
    pub fn describe(column: &ColumnKind) -> Self {
        let (sql_type, collation) = match column {
            ColumnKind::Boolean(_) | ColumnKind::Tristate(_) => ("tinyint(1)".to_string(), None),
            ColumnKind::Integer(c) => {
                let width = c
                    .width()
                    .or_else(|| default_int_width(column.base().sql_type(), c.is_unsigned()));
                let mut t = column.base().sql_type().to_ascii_lowercase();
                if let Some(width) = width {
                    t = format!("{t}({width})");
                }
                if c.is_unsigned() {
                    t.push_str(" unsigned");
                }
                (t, None)
            }
            ColumnKind::Float(_) | ColumnKind::DateTime(_) => {
                (column.base().sql_type().to_ascii_lowercase(), None)
            }
            ColumnKind::Decimal(c) => (format!("decimal({},{})", c.width(), c.precision()), None),
            ColumnKind::Text(c) => describe_text(c),
            ColumnKind::Compound(c) => describe_text(&c.text),
        };
        let default = if column.is_support_default() {
            column.default().and_then(|d| match column.convert_from_string(d) {
                ColumnValue::TriState(TriState::None) => None,
                v @ (ColumnValue::Bool(_) | ColumnValue::TriState(_)) => Some(v.to_sql_literal()),
                _ => Some(d.to_string()),
            })
        } else {
            None
        };
        let key = if column.is_primary() {
            "PRI"
        } else if column.is_index() {
            "MUL"
        } else {
            ""
        };
        Self {
            field: column.name().to_string(),
            sql_type,
            collation,
            null: if column.is_nullable() { "YES" } else { "NO" }.to_string(),
            key: key.to_string(),
            default,
            extra: if column.is_auto_increment() {
                "auto_increment".to_string()
            } else {
                String::new()
            },
            privileges: "select,insert,update,references".to_string(),
            comment: String::new(),
        }
    }

    fn from_row(row: &MySqlRow) -> std::result::Result<Self, sqlx::Error> {
        let required = |name: &str| -> std::result::Result<String, sqlx::Error> {
            Ok(text_field(row, name)?.unwrap_or_default())
        };
        Ok(Self {
            field: required("Field")?,
            sql_type: required("Type")?,
            collation: text_field(row, "Collation")?,
            null: required("Null")?,
            key: required("Key")?,
            default: text_field(row, "Default")?,
            extra: required("Extra")?,
            privileges: required("Privileges")?,
            comment: required("Comment")?,
        })
    }
}

fn describe_text(column: &TextColumn) -> (String, Option<String>) {
    let sql_type = match column.width() {
        Some(width) => format!("varchar({width})"),
        None => column.base.sql_type().to_ascii_lowercase(),
    };
    (sql_type, Some(column.charset().collation().to_string()))
}

/// Reads a textual column that the server may send as either text or
/// binary, depending on version and connection charset.
fn text_field(row: &MySqlRow, name: &str) -> std::result::Result<Option<String>, sqlx::Error> {
    match row.try_get::<Option<String>, _>(name) {
        Ok(value) => Ok(value),
        Err(_) => {
            let bytes: Option<Vec<u8>> = row.try_get(name)?;
            Ok(bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
        }
    }
}

/// Fetches and decodes the live columns of `table`, in table order.
///
/// Rows that cannot be read or whose type is unsupported are logged and
/// skipped; the rest of the table is still returned.
pub async fn fetch_live_columns(pool: &MySqlPool, table: &str) -> Result<Vec<ColumnKind>> {
    let sql = format!("SHOW FULL COLUMNS IN {}", quote_ident(table));
    debug!(sql = %sql, "Introspecting columns");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let decoded = match ShowColumnsRow::from_row(row) {
            Ok(decoded) => decoded,
            Err(e) => {
                error!(table = %table, error = %e, "Failed to read column row, skipping");
                continue;
            }
        };
        debug!(table = %table, row = ?decoded, "Column row");
        match decoded.to_column() {
            Ok(column) => columns.push(column),
            Err(e) => {
                error!(
                    table = %table,
                    column = %decoded.field,
                    sql_type = %decoded.sql_type,
                    error = %e,
                    "Unsupported column, skipping"
                );
            }
        }
    }
    Ok(columns)
}

/// Fetches the `CREATE TABLE` statement MySQL reports for `table`.
pub async fn fetch_create_definition(pool: &MySqlPool, table: &str) -> Result<String> {
    let sql = format!("SHOW CREATE TABLE {}", quote_ident(table));
    debug!(sql = %sql, "Introspecting table definition");
    let row = sqlx::query(&sql).fetch_one(pool).await?;
    text_field(&row, "Create Table")?.ok_or_else(|| SyncError::InvalidDefinition {
        table: table.to_string(),
        message: "SHOW CREATE TABLE returned no definition".to_string(),
    })
}
