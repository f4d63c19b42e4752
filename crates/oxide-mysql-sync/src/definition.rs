//! Parsing of `SHOW CREATE TABLE` output.
//!
//! Only secondary indexes and foreign keys are extracted; columns come from
//! `SHOW FULL COLUMNS` instead (see [`crate::introspect`]).

use std::sync::LazyLock;

use regex::Regex;

use crate::table::{TableConstraint, TableIndex};

static INDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(UNIQUE\s+)?KEY\s+`(\w+)`\s+\((`\w+`(?:\(\d+\))?(?:,\s*`\w+`(?:\(\d+\))?)*)\)")
        .expect("index pattern is valid")
});

static CONSTRAINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"CONSTRAINT\s+`(\w+)`\s+FOREIGN\s+KEY\s+\((`\w+`(?:,\s*`\w+`)*)\)\s+REFERENCES\s+`(\w+)`\s*\((`\w+`(?:,\s*`\w+`)*)\)",
    )
    .expect("constraint pattern is valid")
});

/// Splits a backtick-quoted column list, dropping index prefix lengths:
/// `` `a`(10), `b` `` gives `["a", "b"]`.
fn parse_column_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|part| {
            let part = part.trim();
            let part = part.split_once('(').map_or(part, |(name, _)| name);
            part.trim().trim_matches('`').to_string()
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// Extracts the secondary indexes (`KEY` and `UNIQUE KEY`) of a table
/// definition. The primary key is not reported.
#[must_use]
pub fn parse_indexes(definition: &str) -> Vec<TableIndex> {
    INDEX_RE
        .captures_iter(definition)
        .map(|caps| {
            TableIndex::new(
                &caps[2],
                parse_column_list(&caps[3]),
                caps.get(1).is_some(),
            )
        })
        .collect()
}

/// Extracts the foreign key constraints of a table definition.
#[must_use]
pub fn parse_constraints(definition: &str) -> Vec<TableConstraint> {
    CONSTRAINT_RE
        .captures_iter(definition)
        .map(|caps| {
            TableConstraint::new(
                &caps[1],
                parse_column_list(&caps[2]),
                &caps[3],
                parse_column_list(&caps[4]),
            )
        })
        .collect()
}
