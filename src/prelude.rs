//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::D1ConnectionOptions;
pub use crate::driver::D1Driver;
pub use crate::error::{D1MiddlewareError, ErrorCode};
pub use crate::handle::{
    BatchStatement, D1Database, D1ExecResult, D1PreparedStatement, D1Result, D1ResultMeta,
    HandleError, HandleResult,
};
pub use crate::normalizer::{QueryKind, normalize_query};
pub use crate::runner::{D1QueryRunner, QueryValue, StructuredResult};
pub use crate::schema::{DefaultValue, Table, TableColumn, TableIndex};
pub use crate::types::BindValue;

#[cfg(feature = "test-utils")]
pub use crate::test_utils::{RecordedCall, StubDatabase};
