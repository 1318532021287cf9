//! Driver lifecycle: validate the binding up front, hand out fresh query
//! runners, and run the single post-connect side effect.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::D1ConnectionOptions;
use crate::error::D1MiddlewareError;
use crate::guards;
use crate::handle::D1Database;
use crate::runner::D1QueryRunner;
use crate::runner::sql;

pub struct D1Driver {
    options: D1ConnectionOptions,
    database: Option<Arc<dyn D1Database>>,
    fk_enforced: AtomicBool,
}

impl D1Driver {
    /// Validate the options and take a reference to the binding.
    ///
    /// Failures happen here, before any network activity.
    ///
    /// # Errors
    ///
    /// Returns `D1MiddlewareError::ValidationError` when the options carry no
    /// `database` binding.
    pub fn new(options: D1ConnectionOptions) -> Result<Self, D1MiddlewareError> {
        let database = guards::require_database(&options)?;
        Ok(D1Driver {
            options,
            database: Some(database),
            fk_enforced: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn options(&self) -> &D1ConnectionOptions {
        &self.options
    }

    /// Return the already-validated binding. D1 is stateless HTTP, so there
    /// is no session to open; this only re-checks that the binding is still
    /// held.
    ///
    /// # Errors
    ///
    /// Returns `D1MiddlewareError::ConnectionError` after `disconnect`.
    pub fn connect(&self) -> Result<Arc<dyn D1Database>, D1MiddlewareError> {
        self.database.clone().ok_or_else(|| {
            D1MiddlewareError::ConnectionError(
                "the D1 binding is no longer available; the driver was disconnected".into(),
            )
        })
    }

    /// Drop the binding reference. No network action: there is nothing to
    /// close on a stateless API.
    pub fn disconnect(&mut self) {
        self.database = None;
    }

    /// Always a brand-new runner, never a reused one, so one logical
    /// transaction's bookkeeping cannot leak into an unrelated call.
    ///
    /// # Errors
    ///
    /// Returns `D1MiddlewareError::ConnectionError` after `disconnect`.
    pub fn create_query_runner(&self) -> Result<D1QueryRunner, D1MiddlewareError> {
        Ok(D1QueryRunner::new(self.connect()?, self.options.logging))
    }

    /// Enable foreign-key enforcement, once per driver lifetime, through a
    /// throwaway runner.
    ///
    /// # Errors
    ///
    /// Returns the query error when the pragma statement fails; the guard is
    /// reset so a later call can retry.
    pub async fn after_connect(&self) -> Result<(), D1MiddlewareError> {
        if self.fk_enforced.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut runner = self.create_query_runner()?;
        let outcome = runner.query("PRAGMA foreign_keys = ON", &[]).await;
        runner.release();
        if outcome.is_err() {
            self.fk_enforced.store(false, Ordering::SeqCst);
        }
        outcome.map(|_| ())
    }

    /// Map a logical ORM column type onto the engine's storage type.
    #[must_use]
    pub fn normalize_type(&self, column_type: &str) -> String {
        sql::storage_type(column_type)
    }

    /// Quoted table name as it appears in generated SQL.
    #[must_use]
    pub fn build_table_name(&self, table: &str) -> String {
        sql::quote_identifier(table)
    }
}
