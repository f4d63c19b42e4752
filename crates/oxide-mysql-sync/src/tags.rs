//! Column tags.
//!
//! Columns are declared with a flat map of string tags (`width=128`,
//! `nullable=false`, `charset=ascii`, ...). Constructors pop the tags they
//! understand; whatever is left stays attached to the column.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Overrides the database name of a column.
pub const TAG_NAME: &str = "name";
/// Width of a VARCHAR or integer column.
pub const TAG_WIDTH: &str = "width";
/// Length class of a TEXT column (`medium`, `long`).
pub const TAG_TEXT_LENGTH: &str = "length";
/// Charset of a text column (`utf8`, `ascii`).
pub const TAG_CHARSET: &str = "charset";
/// Digits after the decimal point of a DECIMAL column.
pub const TAG_PRECISION: &str = "precision";
/// Default value, as text.
pub const TAG_DEFAULT: &str = "default";
/// Unique column.
pub const TAG_UNIQUE: &str = "unique";
/// Indexed column.
pub const TAG_INDEX: &str = "index";
/// Part of the primary key.
pub const TAG_PRIMARY: &str = "primary";
/// Nullable column.
pub const TAG_NULLABLE: &str = "nullable";
/// Auto-increment integer; a positive integer value sets the start offset.
pub const TAG_AUTOINCREMENT: &str = "auto_increment";
/// Row version counter.
pub const TAG_AUTOVERSION: &str = "auto_version";
/// Creation timestamp column.
pub const TAG_CREATE_TIMESTAMP: &str = "created_at";
/// Update timestamp column.
pub const TAG_UPDATE_TIMESTAMP: &str = "updated_at";
/// Zero values are written instead of omitted.
pub const TAG_ALLOW_ZERO: &str = "allow_zero";

/// Interprets a tag value as a boolean.
///
/// `true`, `yes`, `on`, `ok` and `1` (any case) are true; everything else
/// is false.
#[must_use]
pub fn to_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "on" | "ok" | "1"
    )
}

/// An ordered map of column tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    /// Creates an empty tag map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a tag, replacing any previous value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a tag, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value of a tag without consuming it.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns whether the tag is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a tag and returns its value.
    pub fn pop(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Removes a tag and interprets it as a boolean.
    pub fn pop_bool(&mut self, key: &str) -> Option<bool> {
        self.pop(key).map(|v| to_bool(&v))
    }

    /// Returns whether no tags are left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the tags in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bool() {
        assert!(to_bool("true"));
        assert!(to_bool("YES"));
        assert!(to_bool("On"));
        assert!(to_bool("ok"));
        assert!(to_bool("1"));
        assert!(!to_bool("false"));
        assert!(!to_bool("0"));
        assert!(!to_bool(""));
        assert!(!to_bool("maybe"));
    }

    #[test]
    fn test_pop_consumes_tag() {
        let mut tags = Tags::new().with(TAG_WIDTH, "32").with(TAG_NULLABLE, "false");
        assert_eq!(tags.pop(TAG_WIDTH).as_deref(), Some("32"));
        assert_eq!(tags.pop(TAG_WIDTH), None);
        assert_eq!(tags.pop_bool(TAG_NULLABLE), Some(false));
        assert!(tags.is_empty());
    }

    #[test]
    fn test_from_iter_and_deserialize() {
        let tags: Tags = [("width", "16"), ("index", "true")].into_iter().collect();
        assert_eq!(tags.get("width"), Some("16"));

        let parsed: Tags = serde_json::from_str(r#"{"index":"true","width":"16"}"#).unwrap();
        assert_eq!(parsed, tags);
    }
}
