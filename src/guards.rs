//! Validation helpers applied before any network activity.

use std::sync::Arc;

use crate::config::D1ConnectionOptions;
use crate::error::D1MiddlewareError;
use crate::handle::D1Database;

/// Assert a condition, failing with a validation error.
///
/// # Errors
///
/// Returns `D1MiddlewareError::ValidationError` with the supplied message
/// when the condition does not hold.
pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), D1MiddlewareError> {
    if condition {
        Ok(())
    } else {
        Err(D1MiddlewareError::ValidationError(message.into()))
    }
}

/// Extract the database binding from the options.
///
/// The capability contract itself is the [`D1Database`] trait, so the only
/// runtime check left is that the binding was supplied at all.
///
/// # Errors
///
/// Returns `D1MiddlewareError::ValidationError` when the `database` field is
/// missing.
pub fn require_database(
    options: &D1ConnectionOptions,
) -> Result<Arc<dyn D1Database>, D1MiddlewareError> {
    options.database.clone().ok_or_else(|| {
        D1MiddlewareError::ValidationError(
            "D1 connection options are missing the `database` binding".into(),
        )
    })
}
