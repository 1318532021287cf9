//! Schema introspection backed by the system catalog.

use serde_json::Value as JsonValue;
use tracing::warn;

use crate::error::D1MiddlewareError;
use crate::parser::parse_create_table;
use crate::schema::Table;
use crate::types::BindValue;

use super::D1QueryRunner;

const TABLE_SQL_QUERY: &str =
    "SELECT name, sql FROM sqlite_master WHERE type = 'table' AND name = ?";

// Internal engine tables (sqlite_* plus D1's _cf_*) are never reported.
const ALL_TABLES_QUERY: &str = "SELECT name, sql FROM sqlite_master WHERE type = 'table' \
     AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_cf_%'";

impl D1QueryRunner {
    /// Reconstruct one table's metadata from its stored CREATE TABLE text.
    ///
    /// A table whose stored SQL fails to parse is reported as not found (the
    /// failure is logged).
    ///
    /// # Errors
    ///
    /// Returns the underlying query error when the catalog read fails.
    pub async fn get_table(&mut self, name: &str) -> Result<Option<Table>, D1MiddlewareError> {
        let value = self
            .query(TABLE_SQL_QUERY, &[BindValue::Text(name.to_string())])
            .await?;
        let Some(sql) = value
            .as_rows()
            .and_then(<[JsonValue]>::first)
            .and_then(|row| row.get("sql"))
            .and_then(JsonValue::as_str)
        else {
            return Ok(None);
        };
        match parse_create_table(sql, name) {
            Ok(table) => Ok(Some(table)),
            Err(err) => {
                warn!(table = name, error = %err, "stored table definition did not parse");
                Ok(None)
            }
        }
    }

    /// Reconstruct metadata for every user table. Tables whose stored SQL
    /// fails to parse are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns the underlying query error when the catalog read fails.
    pub async fn get_tables(&mut self) -> Result<Vec<Table>, D1MiddlewareError> {
        let value = self.query(ALL_TABLES_QUERY, &[]).await?;
        let rows = value.as_rows().unwrap_or(&[]);
        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            let name = row.get("name").and_then(JsonValue::as_str).unwrap_or("");
            let Some(sql) = row.get("sql").and_then(JsonValue::as_str) else {
                continue;
            };
            match parse_create_table(sql, name) {
                Ok(table) => tables.push(table),
                Err(err) => {
                    warn!(table = name, error = %err, "skipping unparsable table definition");
                }
            }
        }
        Ok(tables)
    }

    /// The engine exposes no views; always `None`.
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` mirrors the rest of the surface.
    pub async fn get_view(&mut self, _name: &str) -> Result<Option<Table>, D1MiddlewareError> {
        Ok(None)
    }

    /// The engine exposes no views; always empty.
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` mirrors the rest of the surface.
    pub async fn get_views(&mut self) -> Result<Vec<Table>, D1MiddlewareError> {
        Ok(Vec::new())
    }
}
