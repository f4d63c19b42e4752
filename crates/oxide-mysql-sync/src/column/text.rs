//! Text and compound (JSON) columns.

use std::fmt;

use tracing::warn;

use super::{ColumnBase, pop_width, with_width};
use crate::error::{Result, SyncError};
use crate::tags::{self, Tags};

/// Charset of a text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    /// `utf8mb4` with `utf8mb4_unicode_ci`.
    #[default]
    Utf8,
    /// `ascii` with `ascii_general_ci`.
    Ascii,
}

impl Charset {
    /// Parses the `charset` tag value. Only `utf8` and `ascii` are accepted.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf8" => Some(Self::Utf8),
            "ascii" => Some(Self::Ascii),
            _ => None,
        }
    }

    /// Maps a collation reported by `SHOW FULL COLUMNS` to a charset.
    /// Unknown collations fall back to ASCII.
    #[must_use]
    pub fn from_collation(collation: &str) -> Self {
        match collation {
            "utf8_general_ci" | "utf8mb4_unicode_ci" => Self::Utf8,
            _ => Self::Ascii,
        }
    }

    /// The tag value naming this charset.
    #[must_use]
    pub fn tag_value(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Ascii => "ascii",
        }
    }

    /// MySQL charset name.
    #[must_use]
    pub fn mysql_charset(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8mb4",
            Self::Ascii => "ascii",
        }
    }

    /// MySQL collation name.
    #[must_use]
    pub fn collation(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8mb4_unicode_ci",
            Self::Ascii => "ascii_general_ci",
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_value())
    }
}

/// A `VARCHAR(n)` column, or one of `TEXT`, `MEDIUMTEXT` and `LONGTEXT`
/// when no width is given.
#[derive(Debug, Clone, PartialEq)]
pub struct TextColumn {
    pub(crate) base: ColumnBase,
    width: Option<u32>,
    pub(crate) charset: Charset,
}

impl TextColumn {
    /// Creates a text column.
    ///
    /// A `width` tag makes a `VARCHAR`. Without one, the `length` tag picks
    /// the TEXT class: `medium`, `long`, or plain `TEXT` otherwise.
    pub fn new(name: &str, mut tags: Tags, pointer: bool) -> Result<Self> {
        let charset = match tags.pop(tags::TAG_CHARSET) {
            None => Charset::default(),
            Some(raw) => Charset::parse(&raw).ok_or_else(|| SyncError::UnsupportedCharset {
                column: name.to_string(),
                charset: raw.clone(),
            })?,
        };
        let width = pop_width(name, &mut tags)?;
        let length = tags.pop(tags::TAG_TEXT_LENGTH);
        let sql_type = match (width, length.as_deref().map(str::to_ascii_lowercase)) {
            (Some(_), _) => "VARCHAR",
            (None, Some(l)) if l == "medium" => "MEDIUMTEXT",
            (None, Some(l)) if l == "long" => "LONGTEXT",
            (None, _) => "TEXT",
        };
        let base = ColumnBase::new(name, sql_type, tags, pointer);
        if width.is_none() && base.default().is_some() {
            warn!(
                column = %name,
                sql_type = %sql_type,
                "TEXT columns cannot have a default, default is ignored in DDL"
            );
        }
        Ok(Self {
            base,
            width,
            charset,
        })
    }

    /// Whether this is a `VARCHAR`.
    #[must_use]
    pub fn is_varchar(&self) -> bool {
        self.width.is_some()
    }

    /// `VARCHAR` width.
    #[must_use]
    pub fn width(&self) -> Option<u32> {
        self.width
    }

    /// The column charset.
    #[must_use]
    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub(crate) fn col_type(&self) -> String {
        format!(
            "{} CHARACTER SET '{}' COLLATE '{}'",
            with_width(&self.base.sql_type, self.width),
            self.charset.mysql_charset(),
            self.charset.collation()
        )
    }
}

/// A structured value stored as JSON text.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundColumn {
    pub(crate) text: TextColumn,
}

impl CompoundColumn {
    /// Creates a compound column; it takes the same tags as a text column.
    pub fn new(name: &str, tags: Tags, pointer: bool) -> Result<Self> {
        Ok(Self {
            text: TextColumn::new(name, tags, pointer)?,
        })
    }

    /// Encodes a value for storage.
    #[must_use]
    pub fn encode(value: &serde_json::Value) -> String {
        value.to_string()
    }

    /// Decodes a stored value.
    pub fn decode(s: &str) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnKind;
    use crate::tags::{TAG_CHARSET, TAG_DEFAULT, TAG_TEXT_LENGTH, TAG_WIDTH};
    use crate::value::ColumnValue;

    #[test]
    fn test_text_length_classes() {
        let plain = TextColumn::new("body", Tags::new(), false).unwrap();
        assert_eq!(plain.base.sql_type(), "TEXT");
        assert!(!plain.is_varchar());

        let medium =
            TextColumn::new("body", Tags::new().with(TAG_TEXT_LENGTH, "medium"), false).unwrap();
        assert_eq!(medium.base.sql_type(), "MEDIUMTEXT");

        let long = TextColumn::new("body", Tags::new().with(TAG_TEXT_LENGTH, "LONG"), false).unwrap();
        assert_eq!(
            long.col_type(),
            "LONGTEXT CHARACTER SET 'utf8mb4' COLLATE 'utf8mb4_unicode_ci'"
        );

        let varchar = TextColumn::new(
            "body",
            Tags::new()
                .with(TAG_WIDTH, "32")
                .with(TAG_TEXT_LENGTH, "long"),
            false,
        )
        .unwrap();
        assert_eq!(varchar.base.sql_type(), "VARCHAR");
    }

    #[test]
    fn test_ascii_charset() {
        let col = TextColumn::new(
            "code",
            Tags::new().with(TAG_WIDTH, "16").with(TAG_CHARSET, "ascii"),
            false,
        )
        .unwrap();
        assert_eq!(col.charset(), Charset::Ascii);
        assert_eq!(
            col.col_type(),
            "VARCHAR(16) CHARACTER SET 'ascii' COLLATE 'ascii_general_ci'"
        );
        assert!(ColumnKind::Text(col).is_ascii());
    }

    #[test]
    fn test_unsupported_charset() {
        let err = TextColumn::new("code", Tags::new().with(TAG_CHARSET, "latin1"), false)
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::UnsupportedCharset { ref charset, .. } if charset == "latin1"
        ));
    }

    #[test]
    fn test_charset_from_collation() {
        assert_eq!(Charset::from_collation("utf8mb4_unicode_ci"), Charset::Utf8);
        assert_eq!(Charset::from_collation("utf8_general_ci"), Charset::Utf8);
        assert_eq!(Charset::from_collation("ascii_general_ci"), Charset::Ascii);
        assert_eq!(Charset::from_collation("latin1_swedish_ci"), Charset::Ascii);
        assert_eq!(Charset::from_collation(""), Charset::Ascii);
    }

    #[test]
    fn test_compound_encode_decode() {
        let value = serde_json::json!({"tags": ["a", "b"], "n": 3});
        let encoded = CompoundColumn::encode(&value);
        assert_eq!(CompoundColumn::decode(&encoded).unwrap(), value);
        assert!(CompoundColumn::decode("not json").is_err());

        let col = ColumnKind::Compound(CompoundColumn::new("meta", Tags::new(), false).unwrap());
        assert!(col.is_string());
        assert!(!col.is_searchable());
        assert!(!col.is_support_default());
        assert_eq!(
            col.convert_from_string("[1,2]"),
            ColumnValue::Compound(serde_json::json!([1, 2]))
        );
        assert_eq!(
            col.convert_from_string("plain"),
            ColumnValue::Text("plain".to_string())
        );
    }

    #[test]
    fn test_varchar_compound_keeps_default() {
        let col = ColumnKind::Compound(
            CompoundColumn::new(
                "meta",
                Tags::new().with(TAG_WIDTH, "64").with(TAG_DEFAULT, "[]"),
                false,
            )
            .unwrap(),
        );
        assert_eq!(col.default_literal().as_deref(), Some("'[]'"));
    }
}
