//! Schema mutation operations.
//!
//! The engine's ALTER TABLE is limited, so a number of operations exist only
//! to fail with a diagnostic naming the operation. They fail every time,
//! deterministically, rather than silently doing nothing.

use serde_json::Value as JsonValue;

use crate::error::D1MiddlewareError;
use crate::schema::{Table, TableColumn, TableIndex};

use super::{D1QueryRunner, sql};

impl D1QueryRunner {
    /// `CREATE TABLE IF NOT EXISTS`, unconditionally idempotent.
    ///
    /// # Errors
    ///
    /// Returns the underlying query error when execution fails.
    pub async fn create_table(&mut self, table: &Table) -> Result<(), D1MiddlewareError> {
        let text = sql::create_table_sql(table);
        self.query(&text, &[]).await.map(drop)
    }

    /// # Errors
    ///
    /// Returns the underlying query error when execution fails.
    pub async fn drop_table(&mut self, name: &str) -> Result<(), D1MiddlewareError> {
        let text = format!("DROP TABLE {}", sql::quote_identifier(name));
        self.query(&text, &[]).await.map(drop)
    }

    /// # Errors
    ///
    /// Returns a `ValidationError` when the column is a primary key (the
    /// engine's ALTER TABLE cannot add one), or the underlying query error
    /// when execution fails.
    pub async fn add_column(
        &mut self,
        table: &str,
        column: &TableColumn,
    ) -> Result<(), D1MiddlewareError> {
        if column.is_primary {
            return Err(Self::unsupported("add_column with a primary-key column"));
        }
        let text = sql::add_column_sql(table, column);
        self.query(&text, &[]).await.map(drop)
    }

    /// # Errors
    ///
    /// Same failure modes as [`add_column`](Self::add_column).
    pub async fn add_columns(
        &mut self,
        table: &str,
        columns: &[TableColumn],
    ) -> Result<(), D1MiddlewareError> {
        for column in columns {
            self.add_column(table, column).await?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the underlying query error when execution fails.
    pub async fn create_index(
        &mut self,
        table: &str,
        index: &TableIndex,
    ) -> Result<(), D1MiddlewareError> {
        let text = sql::create_index_sql(table, index);
        self.query(&text, &[]).await.map(drop)
    }

    /// The normalizer upgrades this to `DROP INDEX IF EXISTS`.
    ///
    /// # Errors
    ///
    /// Returns the underlying query error when execution fails.
    pub async fn drop_index(&mut self, name: &str) -> Result<(), D1MiddlewareError> {
        let text = format!("DROP INDEX {}", sql::quote_identifier(name));
        self.query(&text, &[]).await.map(drop)
    }

    /// Delete every row, keeping the table.
    ///
    /// # Errors
    ///
    /// Returns the underlying query error when execution fails.
    pub async fn clear_table(&mut self, name: &str) -> Result<(), D1MiddlewareError> {
        let text = format!("DELETE FROM {}", sql::quote_identifier(name));
        self.query(&text, &[]).await.map(drop)
    }

    /// Drop every user table.
    ///
    /// # Errors
    ///
    /// Returns the underlying query error when a catalog read or a drop
    /// fails.
    pub async fn clear_database(&mut self) -> Result<(), D1MiddlewareError> {
        let value = self
            .query(
                "SELECT name FROM sqlite_master WHERE type = 'table' \
                 AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_cf_%'",
                &[],
            )
            .await?;
        let names: Vec<String> = value
            .as_rows()
            .unwrap_or(&[])
            .iter()
            .filter_map(|row| row.get("name").and_then(JsonValue::as_str))
            .map(str::to_string)
            .collect();
        for name in names {
            self.drop_table(&name).await?;
        }
        Ok(())
    }

    fn unsupported(operation: &str) -> D1MiddlewareError {
        D1MiddlewareError::ValidationError(format!(
            "{operation} is not supported by D1; recreate the table through a migration instead"
        ))
    }

    /// # Errors
    ///
    /// Always fails: the engine cannot drop columns in place.
    pub fn drop_column(&mut self, _table: &str, _column: &str) -> Result<(), D1MiddlewareError> {
        Err(Self::unsupported("drop_column"))
    }

    /// # Errors
    ///
    /// Always fails: the engine cannot drop columns in place.
    pub fn drop_columns(&mut self, _table: &str, _columns: &[String]) -> Result<(), D1MiddlewareError> {
        Err(Self::unsupported("drop_columns"))
    }

    /// # Errors
    ///
    /// Always fails: the engine cannot redefine a column in place.
    pub fn change_column(
        &mut self,
        _table: &str,
        _old: &str,
        _new: &TableColumn,
    ) -> Result<(), D1MiddlewareError> {
        Err(Self::unsupported("change_column"))
    }

    /// # Errors
    ///
    /// Always fails: the engine cannot rename a column in place.
    pub fn rename_column(
        &mut self,
        _table: &str,
        _old: &str,
        _new: &str,
    ) -> Result<(), D1MiddlewareError> {
        Err(Self::unsupported("rename_column"))
    }

    /// # Errors
    ///
    /// Always fails: foreign keys can only be declared at table creation.
    pub fn create_foreign_key(&mut self, _table: &str) -> Result<(), D1MiddlewareError> {
        Err(Self::unsupported("create_foreign_key"))
    }

    /// # Errors
    ///
    /// Always fails: foreign keys can only be declared at table creation.
    pub fn drop_foreign_key(&mut self, _table: &str) -> Result<(), D1MiddlewareError> {
        Err(Self::unsupported("drop_foreign_key"))
    }

    /// # Errors
    ///
    /// Always fails: primary keys can only be declared at table creation.
    pub fn create_primary_key(
        &mut self,
        _table: &str,
        _columns: &[String],
    ) -> Result<(), D1MiddlewareError> {
        Err(Self::unsupported("create_primary_key"))
    }

    /// # Errors
    ///
    /// Always fails: primary keys can only be declared at table creation.
    pub fn drop_primary_key(&mut self, _table: &str) -> Result<(), D1MiddlewareError> {
        Err(Self::unsupported("drop_primary_key"))
    }

    /// # Errors
    ///
    /// Always fails: the engine does not support views.
    pub fn create_view(&mut self, _name: &str, _definition: &str) -> Result<(), D1MiddlewareError> {
        Err(Self::unsupported("create_view"))
    }

    /// # Errors
    ///
    /// Always fails: the engine does not support views.
    pub fn drop_view(&mut self, _name: &str) -> Result<(), D1MiddlewareError> {
        Err(Self::unsupported("drop_view"))
    }
}
