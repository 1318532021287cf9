//! The transaction lifecycle, faithfully fake.
//!
//! D1 offers no client-visible atomicity: every statement executes the
//! moment `query` is called, transaction or not. These methods exist so
//! callers observe a conventional begin/commit/rollback protocol. Commit and
//! rollback are behaviorally identical cleanup; nothing is replayed, undone,
//! or batched.

use crate::error::D1MiddlewareError;

use super::D1QueryRunner;

impl D1QueryRunner {
    /// # Errors
    ///
    /// Returns `D1MiddlewareError::TransactionError` when a transaction is
    /// already active, and `ConnectionError` after `release`.
    pub fn start_transaction(&mut self) -> Result<(), D1MiddlewareError> {
        if self.released {
            return Err(D1MiddlewareError::ConnectionError(
                "the query runner has been released".into(),
            ));
        }
        if self.tx_active {
            return Err(D1MiddlewareError::TransactionError(
                "a transaction is already active on this query runner".into(),
            ));
        }
        self.tx_active = true;
        self.tx_statements.clear();
        self.tx_params.clear();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `D1MiddlewareError::TransactionError` when no transaction is
    /// active.
    pub fn commit_transaction(&mut self) -> Result<(), D1MiddlewareError> {
        if !self.tx_active {
            return Err(D1MiddlewareError::TransactionError(
                "no transaction is active to commit".into(),
            ));
        }
        self.reset_transaction_state();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `D1MiddlewareError::TransactionError` when no transaction is
    /// active. Note that nothing is rolled back: every tracked statement has
    /// already run.
    pub fn rollback_transaction(&mut self) -> Result<(), D1MiddlewareError> {
        if !self.tx_active {
            return Err(D1MiddlewareError::TransactionError(
                "no transaction is active to roll back".into(),
            ));
        }
        self.reset_transaction_state();
        Ok(())
    }

    fn reset_transaction_state(&mut self) {
        self.tx_active = false;
        self.tx_statements.clear();
        self.tx_params.clear();
    }
}
