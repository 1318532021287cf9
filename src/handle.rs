//! The capability contract for a remote D1 database binding.
//!
//! The hosting environment supplies the handle; this crate never constructs
//! one. The contract is the three operations D1 exposes (`prepare`, `batch`,
//! `exec`) plus the prepared-statement surface, checked once at the driver
//! construction boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// An error surfaced by the handle itself rather than embedded in a result
/// envelope (constraint violations typically arrive this way).
///
/// Some harnesses wrap the real engine failure one level down in `cause`;
/// [`root_message`](HandleError::root_message) digs it out.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HandleError {
    pub message: String,
    /// A code the handle may already have assigned, e.g. `SQLITE_ERROR`.
    pub code: Option<String>,
    #[source]
    pub cause: Option<Box<HandleError>>,
}

impl HandleError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        HandleError {
            message: message.into(),
            code: None,
            cause: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: HandleError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The innermost message in the cause chain.
    #[must_use]
    pub fn root_message(&self) -> &str {
        match &self.cause {
            Some(cause) => cause.root_message(),
            None => &self.message,
        }
    }
}

pub type HandleResult<T> = Result<T, HandleError>;

/// Per-call metadata reported by the remote engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct D1ResultMeta {
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub rows_read: u64,
    #[serde(default)]
    pub rows_written: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_row_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<u64>,
}

/// The result envelope every `run`/`all` call produces. Inspected, never
/// mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct D1Result {
    pub success: bool,
    #[serde(default)]
    pub meta: D1ResultMeta,
    #[serde(default)]
    pub results: Vec<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl D1Result {
    /// Successful result carrying rows.
    #[must_use]
    pub fn ok_with_rows(rows: Vec<JsonValue>) -> Self {
        D1Result {
            success: true,
            meta: D1ResultMeta {
                rows_read: rows.len() as u64,
                ..D1ResultMeta::default()
            },
            results: rows,
            error: None,
        }
    }

    /// Successful write result.
    #[must_use]
    pub fn ok_write(last_row_id: Option<i64>, rows_written: u64) -> Self {
        D1Result {
            success: true,
            meta: D1ResultMeta {
                rows_written,
                last_row_id,
                ..D1ResultMeta::default()
            },
            results: Vec::new(),
            error: None,
        }
    }

    /// Failed result carrying an engine message.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        D1Result {
            success: false,
            meta: D1ResultMeta::default(),
            results: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Rows affected by a write: `rows_written`, falling back to `changes`.
    #[must_use]
    pub fn affected(&self) -> u64 {
        if self.meta.rows_written > 0 {
            self.meta.rows_written
        } else {
            self.meta.changes.unwrap_or(0)
        }
    }
}

/// Result of the handle's `exec` fast path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct D1ExecResult {
    pub count: u64,
    pub duration: f64,
}

/// One statement plus its bound parameters, as submitted to `batch`.
#[derive(Debug, Clone)]
pub struct BatchStatement {
    pub sql: String,
    pub params: Vec<JsonValue>,
}

/// A statement created by [`D1Database::prepare`]. Transient, one per query.
#[async_trait]
pub trait D1PreparedStatement: Send {
    /// Attach positional parameters. Values must already be JSON-safe; the
    /// query runner normalizes unset slots to `null` before this call.
    fn bind(&mut self, values: Vec<JsonValue>);

    async fn first(&mut self) -> HandleResult<Option<JsonValue>>;

    async fn run(&mut self) -> HandleResult<D1Result>;

    async fn all(&mut self) -> HandleResult<D1Result>;

    async fn raw(&mut self) -> HandleResult<Vec<JsonValue>>;
}

/// The remote database capability object.
#[async_trait]
pub trait D1Database: Send + Sync {
    fn prepare(&self, sql: &str) -> Box<dyn D1PreparedStatement>;

    async fn batch(&self, statements: Vec<BatchStatement>) -> HandleResult<Vec<D1Result>>;

    async fn exec(&self, sql: &str) -> HandleResult<D1ExecResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_deserializes_from_wire_shape() {
        let raw = json!({
            "success": true,
            "meta": { "duration": 0.5, "rows_read": 2, "rows_written": 0 },
            "results": [ { "id": 1 }, { "id": 2 } ]
        });
        let result: D1Result = serde_json::from_value(raw).unwrap();
        assert!(result.success);
        assert_eq!(result.results.len(), 2);
        assert_eq!(result.meta.last_row_id, None);
    }

    #[test]
    fn affected_falls_back_to_changes() {
        let mut result = D1Result::ok_write(Some(3), 0);
        result.meta.changes = Some(4);
        assert_eq!(result.affected(), 4);
        assert_eq!(D1Result::ok_write(None, 2).affected(), 2);
    }

    #[test]
    fn root_message_walks_the_cause_chain() {
        let err = HandleError::new("outer")
            .with_cause(HandleError::new("middle").with_cause(HandleError::new("inner")));
        assert_eq!(err.root_message(), "inner");
    }
}
