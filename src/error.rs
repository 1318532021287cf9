use thiserror::Error;

use crate::handle::HandleError;

/// Closed set of codes attached to query failures.
///
/// The remote engine reports failures as free text; [`classify_message`]
/// folds that text into one of these codes so callers can match on the
/// failure kind instead of scraping strings themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A `UNIQUE` constraint was violated.
    UniqueConstraint,
    /// A `NOT NULL` constraint was violated.
    NotNullConstraint,
    /// A foreign-key constraint was violated.
    ForeignKeyConstraint,
    /// Engine-level failure (missing table, duplicate object, ...).
    SqliteError,
    /// Generic driver failure; the fallback when nothing more specific matches.
    D1Error,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UniqueConstraint => "SQLITE_CONSTRAINT_UNIQUE",
            ErrorCode::NotNullConstraint => "SQLITE_CONSTRAINT_NOTNULL",
            ErrorCode::ForeignKeyConstraint => "SQLITE_CONSTRAINT_FOREIGNKEY",
            ErrorCode::SqliteError => "SQLITE_ERROR",
            ErrorCode::D1Error => "D1_ERROR",
        }
    }

    /// Parse a code string a handle error may already carry.
    #[must_use]
    pub fn parse(code: &str) -> Option<ErrorCode> {
        match code {
            "SQLITE_CONSTRAINT_UNIQUE" => Some(ErrorCode::UniqueConstraint),
            "SQLITE_CONSTRAINT_NOTNULL" => Some(ErrorCode::NotNullConstraint),
            "SQLITE_CONSTRAINT_FOREIGNKEY" => Some(ErrorCode::ForeignKeyConstraint),
            "SQLITE_ERROR" => Some(ErrorCode::SqliteError),
            "D1_ERROR" => Some(ErrorCode::D1Error),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum D1MiddlewareError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// A statement failed to execute, either as a failed result envelope or
    /// as an error thrown by the handle itself. Both channels end up here so
    /// callers never have to distinguish them.
    #[error("{message}")]
    QueryError {
        message: String,
        code: ErrorCode,
        /// The full offending statement, when known.
        query: Option<String>,
        #[source]
        source: Option<HandleError>,
    },
}

impl D1MiddlewareError {
    /// The classification code, for query errors.
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            D1MiddlewareError::QueryError { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// How many characters of the offending statement make it into messages.
const QUERY_PREVIEW_LEN: usize = 200;

/// Map a free-text engine message onto an [`ErrorCode`] by substring search.
#[must_use]
pub fn classify_message(message: &str, fallback: ErrorCode) -> ErrorCode {
    let lower = message.to_lowercase();
    if lower.contains("unique") {
        ErrorCode::UniqueConstraint
    } else if lower.contains("not null") {
        ErrorCode::NotNullConstraint
    } else if lower.contains("foreign key") {
        ErrorCode::ForeignKeyConstraint
    } else if lower.contains("no such table")
        || lower.contains("already exists")
        || lower.contains("duplicate")
    {
        ErrorCode::SqliteError
    } else {
        fallback
    }
}

/// First `QUERY_PREVIEW_LEN` characters of a statement, with an ellipsis
/// when anything was cut off.
#[must_use]
pub fn query_preview(sql: &str) -> String {
    let mut preview: String = sql.chars().take(QUERY_PREVIEW_LEN).collect();
    if preview.len() < sql.len() {
        preview.push_str("...");
    }
    preview
}

fn format_message(message: &str, query: Option<&str>) -> String {
    match query {
        Some(sql) => format!("D1 Error: {message}\nQuery: {}", query_preview(sql)),
        None => format!("D1 Error: {message}"),
    }
}

/// Wrap a failed result envelope (`success == false`) into a query error.
#[must_use]
pub fn query_error_from_result(message: &str, sql: &str) -> D1MiddlewareError {
    D1MiddlewareError::QueryError {
        message: format_message(message, Some(sql)),
        code: classify_message(message, ErrorCode::D1Error),
        query: Some(sql.to_string()),
        source: None,
    }
}

/// Wrap an error thrown by the handle into a query error.
///
/// Test harnesses wrap the real failure one level down, so the innermost
/// `cause` message wins. An embedded code is honored when it is already one
/// of the known codes; otherwise the message is reclassified.
#[must_use]
pub fn query_error_from_handle(err: HandleError, sql: &str) -> D1MiddlewareError {
    let message = err.root_message().to_string();
    let code = err
        .code
        .as_deref()
        .and_then(ErrorCode::parse)
        .unwrap_or_else(|| classify_message(&message, ErrorCode::D1Error));
    D1MiddlewareError::QueryError {
        message: format_message(&message, Some(sql)),
        code,
        query: Some(sql.to_string()),
        source: Some(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_constraint_messages() {
        assert_eq!(
            classify_message("UNIQUE constraint failed: users.email", ErrorCode::D1Error),
            ErrorCode::UniqueConstraint
        );
        assert_eq!(
            classify_message("NOT NULL constraint failed: users.name", ErrorCode::D1Error),
            ErrorCode::NotNullConstraint
        );
        assert_eq!(
            classify_message("FOREIGN KEY constraint failed", ErrorCode::D1Error),
            ErrorCode::ForeignKeyConstraint
        );
    }

    #[test]
    fn classifies_engine_messages() {
        assert_eq!(
            classify_message("no such table: foo", ErrorCode::D1Error),
            ErrorCode::SqliteError
        );
        assert_eq!(
            classify_message("table foo already exists", ErrorCode::D1Error),
            ErrorCode::SqliteError
        );
        assert_eq!(
            classify_message("duplicate column name: bar", ErrorCode::D1Error),
            ErrorCode::SqliteError
        );
    }

    #[test]
    fn unrelated_message_falls_back() {
        assert_eq!(
            classify_message("disk I/O error", ErrorCode::D1Error),
            ErrorCode::D1Error
        );
    }

    #[test]
    fn message_carries_query_preview() {
        let err = query_error_from_result("no such table: t", "SELECT * FROM t");
        assert_eq!(
            err.to_string(),
            "D1 Error: no such table: t\nQuery: SELECT * FROM t"
        );
        assert_eq!(err.code(), Some(ErrorCode::SqliteError));
    }

    #[test]
    fn long_query_is_truncated() {
        let sql = format!("SELECT * FROM t WHERE x = '{}'", "a".repeat(400));
        let err = query_error_from_result("boom", &sql);
        let message = err.to_string();
        assert!(message.ends_with("..."));
        assert!(message.len() < sql.len());
    }

    #[test]
    fn handle_error_prefers_nested_cause() {
        let err = HandleError::new("wrapper failure")
            .with_cause(HandleError::new("UNIQUE constraint failed: t.a"));
        let wrapped = query_error_from_handle(err, "INSERT INTO t VALUES (1)");
        assert_eq!(wrapped.code(), Some(ErrorCode::UniqueConstraint));
        assert!(wrapped.to_string().contains("UNIQUE constraint failed: t.a"));
    }

    #[test]
    fn handle_error_honors_known_code() {
        let err = HandleError::new("opaque message").with_code("SQLITE_CONSTRAINT_FOREIGNKEY");
        let wrapped = query_error_from_handle(err, "DELETE FROM t");
        assert_eq!(wrapped.code(), Some(ErrorCode::ForeignKeyConstraint));
    }

    #[test]
    fn unknown_embedded_code_is_reclassified() {
        let err = HandleError::new("no such table: q").with_code("SOMETHING_ELSE");
        let wrapped = query_error_from_handle(err, "SELECT 1");
        assert_eq!(wrapped.code(), Some(ErrorCode::SqliteError));
    }
}
