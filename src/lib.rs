//! Adapter exposing Cloudflare D1 through a generic driver and query-runner
//! interface, so repository/query-builder code can run against D1 with
//! minimal changes.
//!
//! The hosting runtime supplies the database binding (see
//! [`handle::D1Database`]); this crate validates it, executes SQL through
//! it, reconstructs table metadata from the system catalog, and folds D1's
//! two failure channels into one typed error.
//!
//! D1 has no client-visible atomicity: the transaction methods on
//! [`runner::D1QueryRunner`] are bookkeeping only, and commit/rollback are
//! cleanup. See the `runner::transaction` module notes before relying on
//! them.

pub mod config;
pub mod driver;
pub mod error;
pub mod guards;
pub mod handle;
pub mod normalizer;
pub mod parser;
pub mod prelude;
pub mod registry;
pub mod runner;
pub mod schema;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use config::D1ConnectionOptions;
pub use driver::D1Driver;
pub use error::{D1MiddlewareError, ErrorCode};
pub use runner::{D1QueryRunner, QueryValue, StructuredResult};
