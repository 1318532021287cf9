//! SQL text generation for schema operations.
//!
//! The exact output shapes are compatibility-critical: synchronization
//! relies on `IF NOT EXISTS`, and introspection round-trips this text
//! through the CREATE TABLE parser.

use std::fmt::Write;

use crate::schema::{DefaultValue, Table, TableColumn, TableIndex};

/// Double-quote an identifier, doubling embedded quotes.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Map a logical ORM type onto the engine's storage type. Unrecognized
/// types pass through uppercased.
#[must_use]
pub fn storage_type(logical: &str) -> String {
    match logical.to_ascii_lowercase().as_str() {
        "int" | "integer" | "bigint" | "smallint" | "tinyint" => "INTEGER".into(),
        "float" | "double" | "real" | "decimal" | "numeric" => "REAL".into(),
        "text" | "string" | "varchar" | "char" => "TEXT".into(),
        "blob" => "BLOB".into(),
        "date" | "datetime" | "timestamp" | "time" => "TEXT".into(),
        "boolean" | "bool" => "INTEGER".into(),
        _ => logical.to_ascii_uppercase(),
    }
}

/// Literal text for a `DEFAULT` clause.
#[must_use]
pub fn format_default(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Null => "NULL".into(),
        DefaultValue::Bool(true) => "1".into(),
        DefaultValue::Bool(false) => "0".into(),
        DefaultValue::Integer(i) => i.to_string(),
        DefaultValue::Real(f) => f.to_string(),
        DefaultValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        DefaultValue::Expression(e) => e.clone(),
    }
}

/// One column definition fragment.
///
/// `inline_primary` is false when the table has a composite key, which is
/// emitted as a trailing table-level clause instead.
#[must_use]
pub fn column_fragment(column: &TableColumn, inline_primary: bool) -> String {
    let mut out = quote_identifier(&column.name);
    let storage = storage_type(&column.column_type);
    if inline_primary && column.is_primary && column.is_generated && storage == "INTEGER" {
        out.push_str(" INTEGER PRIMARY KEY AUTOINCREMENT");
    } else {
        let _ = write!(out, " {storage}");
        if inline_primary && column.is_primary {
            out.push_str(" PRIMARY KEY");
        }
        if column.is_unique && !column.is_primary {
            out.push_str(" UNIQUE");
        }
        if !column.is_nullable && !column.is_primary {
            out.push_str(" NOT NULL");
        }
    }
    if let Some(default) = &column.default {
        let _ = write!(out, " DEFAULT {}", format_default(default));
    }
    out
}

/// `CREATE TABLE IF NOT EXISTS ...` — unconditionally idempotent so schema
/// synchronization can re-run.
#[must_use]
pub fn create_table_sql(table: &Table) -> String {
    let primary = table.primary_columns();
    let inline_primary = primary.len() <= 1;
    let mut fragments: Vec<String> = table
        .columns
        .iter()
        .map(|column| column_fragment(column, inline_primary))
        .collect();
    if !inline_primary {
        let keys = primary
            .iter()
            .map(|c| quote_identifier(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        fragments.push(format!("PRIMARY KEY ({keys})"));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_identifier(&table.name),
        fragments.join(", ")
    )
}

/// Name used when an index is created without one.
#[must_use]
pub fn default_index_name(table: &str, columns: &[String]) -> String {
    format!("IDX_{table}_{}", columns.join("_"))
}

#[must_use]
pub fn create_index_sql(table: &str, index: &TableIndex) -> String {
    let name = index
        .name
        .clone()
        .unwrap_or_else(|| default_index_name(table, &index.columns));
    let columns = index
        .columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE {}INDEX IF NOT EXISTS {} ON {} ({columns})",
        if index.is_unique { "UNIQUE " } else { "" },
        quote_identifier(&name),
        quote_identifier(table)
    )
}

#[must_use]
pub fn add_column_sql(table: &str, column: &TableColumn) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN {}",
        quote_identifier(table),
        column_fragment(column, false)
    )
}
