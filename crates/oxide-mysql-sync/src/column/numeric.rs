//! Integer, floating point and fixed point columns.

use super::{ColumnBase, pop_width, with_width};
use crate::error::{Result, SyncError};
use crate::tags::{self, Tags};
use crate::value::ColumnValue;

/// Display widths MySQL reports for signed integers declared without one.
pub const INT_WIDTH_DEFAULT: &[(&str, u32)] = &[
    ("TINYINT", 4),
    ("SMALLINT", 6),
    ("MEDIUMINT", 9),
    ("INT", 11),
    ("BIGINT", 20),
];

/// Display widths MySQL reports for unsigned integers declared without one.
pub const UNSIGNED_INT_WIDTH_DEFAULT: &[(&str, u32)] = &[
    ("TINYINT", 3),
    ("SMALLINT", 5),
    ("MEDIUMINT", 8),
    ("INT", 10),
    ("BIGINT", 20),
];

/// Looks up the default display width of an integer type.
#[must_use]
pub fn default_int_width(sql_type: &str, unsigned: bool) -> Option<u32> {
    let table = if unsigned {
        UNSIGNED_INT_WIDTH_DEFAULT
    } else {
        INT_WIDTH_DEFAULT
    };
    table
        .iter()
        .find(|(t, _)| t.eq_ignore_ascii_case(sql_type))
        .map(|&(_, w)| w)
}

/// An integer column, optionally unsigned, auto-increment or a version
/// counter.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerColumn {
    pub(crate) base: ColumnBase,
    pub(crate) width: Option<u32>,
    pub(crate) unsigned: bool,
    pub(crate) auto_increment: bool,
    pub(crate) auto_increment_offset: u64,
    pub(crate) auto_version: bool,
}

impl IntegerColumn {
    /// Creates an integer column of type `sql_type` (`TINYINT` ... `BIGINT`).
    ///
    /// `auto_increment=<n>` with a positive `n` enables auto-increment and
    /// starts the sequence at `n`; any other value is read as a boolean.
    /// Auto-increment columns are primary and not nullable. Version
    /// columns are not primary, not nullable, and default to 0.
    pub fn new(
        name: &str,
        sql_type: &str,
        unsigned: bool,
        mut tags: Tags,
        pointer: bool,
    ) -> Result<Self> {
        let sql_type = sql_type.to_ascii_uppercase();
        if default_int_width(&sql_type, unsigned).is_none() {
            return Err(SyncError::UnsupportedType {
                column: name.to_string(),
                sql_type,
            });
        }

        let mut auto_increment = false;
        let mut auto_increment_offset = 0;
        if let Some(v) = tags.pop(tags::TAG_AUTOINCREMENT) {
            match v.trim().parse::<u64>() {
                Ok(offset) if offset > 0 => {
                    auto_increment = true;
                    auto_increment_offset = offset;
                }
                _ => auto_increment = tags::to_bool(&v),
            }
        }
        let mut auto_version = tags.pop_bool(tags::TAG_AUTOVERSION).unwrap_or(false);

        let width = pop_width(name, &mut tags)?;
        let mut base = ColumnBase::new(name, &sql_type, tags, pointer);
        if auto_increment {
            base.primary = true;
            base.nullable = false;
            auto_version = false;
        } else if auto_version {
            base.primary = false;
            base.nullable = false;
            if base.default.is_none() {
                base.default = Some("0".to_string());
            }
        }

        Ok(Self {
            base,
            width,
            unsigned,
            auto_increment,
            auto_increment_offset,
            auto_version,
        })
    }

    /// Whether the column is unsigned.
    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        self.unsigned
    }

    /// Declared display width.
    #[must_use]
    pub fn width(&self) -> Option<u32> {
        self.width
    }

    /// First value of the auto-increment sequence, 0 when unset.
    #[must_use]
    pub fn auto_increment_offset(&self) -> u64 {
        self.auto_increment_offset
    }

    pub(crate) fn col_type(&self) -> String {
        let mut sql = with_width(&self.base.sql_type, self.width);
        if self.unsigned {
            sql.push_str(" UNSIGNED");
        }
        sql
    }

    pub(crate) fn convert_from_string(&self, s: &str) -> ColumnValue {
        let s = s.trim();
        let parsed = if self.unsigned {
            s.parse::<u64>().ok().map(ColumnValue::UInt)
        } else {
            s.parse::<i64>().ok().map(ColumnValue::Int)
        };
        parsed.unwrap_or_else(|| ColumnValue::Text(s.to_string()))
    }
}

/// A `FLOAT` or `DOUBLE` column.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatColumn {
    pub(crate) base: ColumnBase,
}

impl FloatColumn {
    /// Creates a floating point column of type `sql_type`.
    pub fn new(name: &str, sql_type: &str, tags: Tags, pointer: bool) -> Result<Self> {
        let sql_type = sql_type.to_ascii_uppercase();
        if sql_type != "FLOAT" && sql_type != "DOUBLE" {
            return Err(SyncError::UnsupportedType {
                column: name.to_string(),
                sql_type,
            });
        }
        Ok(Self {
            base: ColumnBase::new(name, &sql_type, tags, pointer),
        })
    }
}

/// A `DECIMAL(width, precision)` column.
#[derive(Debug, Clone, PartialEq)]
pub struct DecimalColumn {
    pub(crate) base: ColumnBase,
    width: Option<u32>,
    precision: u32,
}

impl DecimalColumn {
    /// MySQL's digit count when none is declared.
    const DEFAULT_WIDTH: u32 = 10;

    /// Creates a decimal column. The `precision` tag is mandatory.
    pub fn new(name: &str, mut tags: Tags, pointer: bool) -> Result<Self> {
        let raw = tags
            .pop(tags::TAG_PRECISION)
            .ok_or_else(|| SyncError::MissingPrecision {
                column: name.to_string(),
            })?;
        let precision = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| SyncError::InvalidTagValue {
                column: name.to_string(),
                tag: tags::TAG_PRECISION.to_string(),
                value: raw.clone(),
            })?;
        let width = pop_width(name, &mut tags)?;
        Ok(Self {
            base: ColumnBase::new(name, "DECIMAL", tags, pointer),
            width,
            precision,
        })
    }

    /// Total number of digits.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width.unwrap_or(Self::DEFAULT_WIDTH)
    }

    /// Digits after the decimal point.
    #[must_use]
    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub(crate) fn col_type(&self) -> String {
        format!("{}({}, {})", self.base.sql_type, self.width(), self.precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnKind;
    use crate::tags::{TAG_DEFAULT, TAG_PRIMARY, TAG_WIDTH};

    #[test]
    fn test_default_int_width() {
        assert_eq!(default_int_width("INT", false), Some(11));
        assert_eq!(default_int_width("int", true), Some(10));
        assert_eq!(default_int_width("TINYINT", false), Some(4));
        assert_eq!(default_int_width("TINYINT", true), Some(3));
        assert_eq!(default_int_width("BIGINT", true), Some(20));
        assert_eq!(default_int_width("VARCHAR", false), None);
    }

    #[test]
    fn test_auto_increment_forces_primary() {
        let col = IntegerColumn::new(
            "id",
            "BIGINT",
            true,
            Tags::new()
                .with(tags::TAG_AUTOINCREMENT, "true")
                .with(tags::TAG_AUTOVERSION, "true"),
            false,
        )
        .unwrap();
        assert!(col.auto_increment);
        assert!(!col.auto_version);
        assert_eq!(col.auto_increment_offset(), 0);
        let col = ColumnKind::Integer(col);
        assert!(col.is_primary());
        assert!(!col.is_nullable());
        assert_eq!(
            col.definition_string(),
            "`id` BIGINT UNSIGNED NOT NULL AUTO_INCREMENT"
        );
    }

    #[test]
    fn test_auto_increment_offset() {
        let col = IntegerColumn::new(
            "id",
            "INT",
            false,
            Tags::new().with(tags::TAG_AUTOINCREMENT, "1000"),
            false,
        )
        .unwrap();
        assert!(col.auto_increment);
        assert_eq!(col.auto_increment_offset(), 1000);
    }

    #[test]
    fn test_auto_version_defaults_to_zero() {
        let col = IntegerColumn::new(
            "update_version",
            "INT",
            false,
            Tags::new()
                .with(tags::TAG_AUTOVERSION, "true")
                .with(TAG_PRIMARY, "true"),
            false,
        )
        .unwrap();
        let col = ColumnKind::Integer(col);
        assert!(col.is_auto_version());
        assert!(!col.is_primary());
        assert!(!col.is_nullable());
        assert_eq!(col.default(), Some("0"));
        assert_eq!(
            col.definition_string(),
            "`update_version` INT NOT NULL DEFAULT 0"
        );
    }

    #[test]
    fn test_integer_width_and_default() {
        let col = ColumnKind::Integer(
            IntegerColumn::new(
                "count",
                "smallint",
                false,
                Tags::new().with(TAG_WIDTH, "6").with(TAG_DEFAULT, "-1"),
                false,
            )
            .unwrap(),
        );
        assert_eq!(col.col_type(), "SMALLINT(6)");
        assert_eq!(col.convert_from_string("-1"), ColumnValue::Int(-1));
        assert_eq!(col.definition_string(), "`count` SMALLINT(6) DEFAULT -1");
    }

    #[test]
    fn test_unknown_integer_type() {
        let err = IntegerColumn::new("n", "HUGEINT", false, Tags::new(), false).unwrap_err();
        assert!(matches!(err, SyncError::UnsupportedType { .. }));
    }

    #[test]
    fn test_float_column() {
        let col = ColumnKind::Float(FloatColumn::new("ratio", "double", Tags::new(), false).unwrap());
        assert_eq!(col.col_type(), "DOUBLE");
        assert!(col.is_numeric());
        assert_eq!(col.convert_from_string("0.25"), ColumnValue::Float(0.25));
    }

    #[test]
    fn test_decimal_requires_precision() {
        let err = DecimalColumn::new("price", Tags::new().with(TAG_WIDTH, "10"), false).unwrap_err();
        assert!(matches!(err, SyncError::MissingPrecision { ref column } if column == "price"));

        let err = DecimalColumn::new(
            "price",
            Tags::new().with(tags::TAG_PRECISION, "two"),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::InvalidTagValue { .. }));
    }

    #[test]
    fn test_decimal_col_type() {
        let col = DecimalColumn::new(
            "price",
            Tags::new()
                .with(TAG_WIDTH, "10")
                .with(tags::TAG_PRECISION, "2")
                .with(TAG_DEFAULT, "0.50"),
            false,
        )
        .unwrap();
        assert_eq!(col.width(), 10);
        assert_eq!(col.precision(), 2);
        let col = ColumnKind::Decimal(col);
        assert_eq!(col.definition_string(), "`price` DECIMAL(10, 2) DEFAULT 0.5");
    }
}
