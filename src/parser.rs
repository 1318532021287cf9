//! Reconstructs [`Table`] metadata from the stored `CREATE TABLE` text.
//!
//! This is deliberately minimal: enough to satisfy introspection, not a SQL
//! parser. Table-level constraints (composite keys, foreign keys) are
//! dropped, so they stay invisible to callers.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{D1MiddlewareError, query_preview};
use crate::schema::{DefaultValue, Table, TableColumn};

static CREATE_TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)^\s*CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:"((?:[^"]|"")+)"|([A-Za-z_][\w$]*))\s*\((.*)\)\s*;?\s*$"#,
    )
    .expect("create-table pattern")
});

static COLUMN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)^\s*(?:"((?:[^"]|"")+)"|([A-Za-z_][\w$]*))\s+([A-Za-z_]\w*)"#)
        .expect("column pattern")
});

static TABLE_CONSTRAINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(PRIMARY\s+KEY|FOREIGN\s+KEY|UNIQUE\b|CHECK\b)").expect("constraint pattern")
});

static PRIMARY_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPRIMARY\s+KEY\b").expect("primary-key pattern"));

static UNIQUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bUNIQUE\b").expect("unique pattern"));

static NOT_NULL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bNOT\s+NULL\b").expect("not-null pattern"));

static AUTOINCREMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bAUTOINCREMENT\b").expect("autoincrement pattern"));

static DEFAULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bDEFAULT\s+('(?:[^']|'')*'|"(?:[^"]|"")*"|[A-Za-z_]\w*\s*\([^()]*\)|[^\s,)]+)"#)
        .expect("default pattern")
});

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+$").expect("integer pattern"));

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+\.\d+$").expect("decimal pattern"));

/// Parse stored `CREATE TABLE` text back into table metadata.
///
/// # Errors
///
/// Returns `D1MiddlewareError::ValidationError` with a 200-character preview
/// of the offending SQL when the outer statement shape is not recognized.
/// Callers treat this as recoverable: list-level introspection skips the
/// table, single-item introspection reports "not found".
pub fn parse_create_table(sql: &str, expected_name: &str) -> Result<Table, D1MiddlewareError> {
    let caps = CREATE_TABLE_RE.captures(sql).ok_or_else(|| {
        D1MiddlewareError::ValidationError(format!(
            "cannot parse CREATE TABLE statement for \"{expected_name}\": {}",
            query_preview(sql)
        ))
    })?;

    let name = caps
        .get(1)
        .map(|m| m.as_str().replace("\"\"", "\""))
        .or_else(|| caps.get(2).map(|m| m.as_str().to_string()))
        .unwrap_or_default();
    let body = caps.get(3).map_or("", |m| m.as_str());

    let mut table = Table::new(name);
    for fragment in split_top_level(body) {
        let fragment = fragment.trim();
        if fragment.is_empty() || TABLE_CONSTRAINT_RE.is_match(fragment) {
            continue;
        }
        if let Some(column) = parse_column(fragment) {
            table.columns.push(column);
        }
    }
    Ok(table)
}

/// Split a column-list body on top-level commas only, so nested expressions
/// (CHECK constraints, function-call defaults) stay intact.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;
    for (i, ch) in body.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

fn parse_column(fragment: &str) -> Option<TableColumn> {
    let caps = COLUMN_RE.captures(fragment)?;
    let name = caps
        .get(1)
        .map(|m| m.as_str().replace("\"\"", "\""))
        .or_else(|| caps.get(2).map(|m| m.as_str().to_string()))?;
    let column_type = caps.get(3)?.as_str().to_lowercase();

    // Each attribute is detected independently over the whole fragment.
    let is_primary = PRIMARY_KEY_RE.is_match(fragment);
    let is_unique = UNIQUE_RE.is_match(fragment);
    let is_nullable = !is_primary && !NOT_NULL_RE.is_match(fragment);
    let is_generated = AUTOINCREMENT_RE.is_match(fragment);
    let default = DEFAULT_RE
        .captures(fragment)
        .and_then(|c| c.get(1))
        .map(|m| parse_default_literal(m.as_str()));

    Some(TableColumn {
        name,
        column_type,
        is_primary,
        is_unique,
        is_nullable,
        is_generated,
        default,
    })
}

/// Interpret the token following `DEFAULT`.
#[must_use]
pub fn parse_default_literal(token: &str) -> DefaultValue {
    let token = token.trim();
    if token.eq_ignore_ascii_case("NULL") {
        return DefaultValue::Null;
    }
    if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
        return DefaultValue::Text(token[1..token.len() - 1].replace("''", "'"));
    }
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        return DefaultValue::Text(token[1..token.len() - 1].replace("\"\"", "\""));
    }
    // Bare 0/1 are booleans; other numeric tokens keep their numeric kind.
    if token == "0" {
        return DefaultValue::Bool(false);
    }
    if token == "1" {
        return DefaultValue::Bool(true);
    }
    if INTEGER_RE.is_match(token) {
        if let Ok(value) = token.parse::<i64>() {
            return DefaultValue::Integer(value);
        }
    }
    if DECIMAL_RE.is_match(token) {
        if let Ok(value) = token.parse::<f64>() {
            return DefaultValue::Real(value);
        }
    }
    // Function calls and anything unrecognized pass through as SQL text.
    DefaultValue::Expression(token.to_string())
}
