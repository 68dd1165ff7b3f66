//! Transaction specific errors
//!
//! This module contains error types raised by the transaction machinery
//! itself, as opposed to the store it commits to.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running a transaction
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Transaction has already been committed and cannot be used again
    #[error("Transaction has already been committed")]
    TransactionAlreadyCommitted,

    /// The caller-supplied deadline elapsed before the operation committed.
    ///
    /// Nothing from the interrupted attempt was applied.
    #[error("Operation '{operation}' exceeded its deadline of {limit:?}")]
    DeadlineExceeded {
        operation: &'static str,
        limit: Duration,
    },
}

impl TransactionError {
    /// Check if this error indicates the transaction was already committed
    pub fn is_already_committed(&self) -> bool {
        matches!(self, TransactionError::TransactionAlreadyCommitted)
    }

    /// Check if this error indicates a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransactionError::DeadlineExceeded { .. })
    }
}

// Conversion from TransactionError to the main Error type
impl From<TransactionError> for crate::Error {
    fn from(err: TransactionError) -> Self {
        crate::Error::Transaction(err)
    }
}
