//! Per-request query runner.
//!
//! Module layout:
//! - `mod`: the runner itself and the shared execution core
//! - `transaction`: the begin/commit/rollback lifecycle
//! - `introspect`: table/view metadata reads
//! - `mutate`: schema mutation operations
//! - `sql`: SQL text generation

mod introspect;
mod mutate;
pub mod sql;
mod transaction;

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{self, D1MiddlewareError};
use crate::handle::{D1Database, D1Result};
use crate::normalizer::{QueryKind, normalize_query};
use crate::types::BindValue;

/// What `query` hands back in unstructured mode.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Bare rows, for select-like statements.
    Rows(Vec<JsonValue>),
    /// The last inserted row id, for inserts.
    InsertId(Option<i64>),
    /// Generic mutations return nothing.
    None,
}

impl QueryValue {
    #[must_use]
    pub fn as_rows(&self) -> Option<&[JsonValue]> {
        if let QueryValue::Rows(rows) = self {
            Some(rows)
        } else {
            None
        }
    }

    #[must_use]
    pub fn insert_id(&self) -> Option<i64> {
        if let QueryValue::InsertId(id) = self {
            *id
        } else {
            None
        }
    }
}

/// The `{raw, records, affected}` envelope some callers request instead of
/// bare rows/ids.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredResult {
    /// Rows for selects, the inserted id for inserts.
    pub raw: JsonValue,
    pub records: Vec<JsonValue>,
    pub affected: u64,
}

/// Executes SQL against the remote binding and carries the (observational)
/// transaction bookkeeping. One instance per logical request; never reused.
pub struct D1QueryRunner {
    database: Arc<dyn D1Database>,
    logging: bool,
    tx_active: bool,
    tx_statements: Vec<String>,
    tx_params: Vec<Vec<BindValue>>,
    released: bool,
}

impl D1QueryRunner {
    pub(crate) fn new(database: Arc<dyn D1Database>, logging: bool) -> Self {
        D1QueryRunner {
            database,
            logging,
            tx_active: false,
            tx_statements: Vec::new(),
            tx_params: Vec::new(),
            released: false,
        }
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    #[must_use]
    pub fn is_transaction_active(&self) -> bool {
        self.tx_active
    }

    /// Statements recorded while a transaction was active. Bookkeeping only;
    /// every one of them already executed at `query` time.
    #[must_use]
    pub fn tracked_statements(&self) -> &[String] {
        &self.tx_statements
    }

    #[must_use]
    pub fn tracked_params(&self) -> &[Vec<BindValue>] {
        &self.tx_params
    }

    /// Mark the runner unusable and drop all bookkeeping.
    pub fn release(&mut self) {
        self.tx_active = false;
        self.tx_statements.clear();
        self.tx_params.clear();
        self.released = true;
    }

    /// Shared execution core: normalize, classify, track, execute, and fold
    /// both failure channels into one error shape.
    async fn execute(
        &mut self,
        sql: &str,
        params: &[BindValue],
    ) -> Result<(QueryKind, D1Result), D1MiddlewareError> {
        if self.released {
            return Err(D1MiddlewareError::ConnectionError(
                "the query runner has been released".into(),
            ));
        }

        let normalized = normalize_query(sql);
        let kind = QueryKind::of(&normalized);

        if self.tx_active {
            // Observational only: execution is never deferred to commit time.
            self.tx_statements.push(normalized.to_string());
            self.tx_params.push(params.to_vec());
        }

        if self.logging {
            debug!(query = %normalized, "executing statement");
        }

        let mut stmt = self.database.prepare(&normalized);
        stmt.bind(params.iter().map(BindValue::to_json).collect());

        let outcome = if kind.is_select() {
            stmt.all().await
        } else {
            stmt.run().await
        };

        let result = match outcome {
            Ok(result) => result,
            Err(err) => return Err(error::query_error_from_handle(err, &normalized)),
        };
        if !result.success {
            let message = result
                .error
                .as_deref()
                .unwrap_or("the statement failed without error detail");
            return Err(error::query_error_from_result(message, &normalized));
        }
        Ok((kind, result))
    }

    /// Execute a statement and shape the outcome by statement kind: rows for
    /// selects, the inserted id for inserts, nothing otherwise.
    ///
    /// # Errors
    ///
    /// Returns a `QueryError` for both failed result envelopes and errors
    /// thrown by the handle, and a `ConnectionError` after `release`.
    pub async fn query(
        &mut self,
        sql: &str,
        params: &[BindValue],
    ) -> Result<QueryValue, D1MiddlewareError> {
        let (kind, result) = self.execute(sql, params).await?;
        Ok(match kind {
            QueryKind::Select => QueryValue::Rows(result.results),
            QueryKind::Insert => QueryValue::InsertId(result.meta.last_row_id),
            QueryKind::Other => QueryValue::None,
        })
    }

    /// Execute a statement and return the structured envelope.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`query`](Self::query).
    pub async fn query_structured(
        &mut self,
        sql: &str,
        params: &[BindValue],
    ) -> Result<StructuredResult, D1MiddlewareError> {
        let (kind, result) = self.execute(sql, params).await?;
        let affected = result.affected();
        let (raw, records) = match kind {
            QueryKind::Insert => (
                result.meta.last_row_id.map_or(JsonValue::Null, JsonValue::from),
                Vec::new(),
            ),
            _ => (JsonValue::Array(result.results.clone()), result.results),
        };
        Ok(StructuredResult {
            raw,
            records,
            affected,
        })
    }
}
