//! Error types for the ledger
//!
//! This module defines every failure that can surface from the account store,
//! the transfer engine, the task executor and the CLI's CSV handling.
//! Errors are values: transfer failures are delivered through the completion
//! handle rather than panicking on a worker thread.
//!
//! # Error Categories
//!
//! - **Lookup Errors**: account not found by id or by number
//! - **Business Rejections**: insufficient balance, invalid request
//! - **Concurrency Errors**: stale version, exhausted retries, failed compensation
//! - **Executor Errors**: queue full, executor shut down, aborted task
//! - **I/O Errors**: file and CSV problems in the CLI

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

use super::account::AccountId;

/// Which side of a lookup an account number was resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRole {
    /// The debited account of a transfer
    Sender,
    /// The credited account of a transfer
    Receiver,
    /// A plain lookup outside of a transfer
    Lookup,
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRole::Sender => write!(f, "sender"),
            AccountRole::Receiver => write!(f, "receiver"),
            AccountRole::Lookup => write!(f, "lookup"),
        }
    }
}

/// Main error type for the ledger
///
/// Each variant carries enough context for the caller to produce a
/// client-visible message; [`LedgerError::http_status`] suggests the status
/// a presentation layer should answer with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// No account with the given surrogate id
    #[error("Account with id {id} not found")]
    AccountNotFoundById {
        /// The id that was looked up
        id: AccountId,
    },

    /// No account with the given account number
    #[error("Account {number} not found ({role})")]
    AccountNotFoundByNumber {
        /// The account number that was looked up
        number: String,
        /// Whether the lookup was for the sender, receiver or a plain read
        role: AccountRole,
    },

    /// The sender cannot cover the requested amount
    ///
    /// Non-retryable. No balance was changed.
    #[error(
        "Insufficient balance on account {account_number}: available {available}, requested {requested}"
    )]
    InsufficientBalance {
        /// Account number of the sender
        account_number: String,
        /// Balance at the time of the check
        available: Decimal,
        /// Requested transfer amount
        requested: Decimal,
    },

    /// The stored record was written since it was read
    ///
    /// Transient. The transfer engine retries on this signal.
    #[error("Account {id} was modified concurrently: expected version {expected}, found {actual}")]
    ConflictingVersion {
        /// Surrogate id of the record
        id: AccountId,
        /// Version the writer had read
        expected: u64,
        /// Version currently stored
        actual: u64,
    },

    /// Every retry of a transfer hit a version conflict
    #[error("Transfer abandoned after {attempts} conflicting attempts")]
    ConflictExhausted {
        /// Number of attempts made
        attempts: u32,
    },

    /// The request was rejected before touching any lock or record
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected
        reason: String,
    },

    /// Another account already uses this account number
    #[error("Account number {number} is already taken")]
    DuplicateAccountNumber {
        /// The contested account number
        number: String,
    },

    /// A balance computation overflowed
    #[error("Arithmetic overflow in {operation} on account {account_number}")]
    ArithmeticOverflow {
        /// Operation that overflowed
        operation: String,
        /// Account being modified
        account_number: String,
    },

    /// A debit was persisted but its credit failed and could not be undone
    ///
    /// The ledger needs manual reconciliation for this account.
    #[error("Could not restore {amount} to account {account_number} after a failed transfer")]
    CompensationFailed {
        /// Sender whose debit could not be reverted
        account_number: String,
        /// Amount left debited
        amount: Decimal,
    },

    /// The bounded task queue is full
    #[error("Transfer queue is full ({capacity} pending)")]
    QueueFull {
        /// Configured queue capacity
        capacity: usize,
    },

    /// The executor no longer accepts work
    #[error("Transfer executor is shut down")]
    ExecutorShutdown,

    /// The task ended without producing an outcome
    #[error("Transfer task aborted before completing")]
    TaskAborted,

    /// I/O error while reading or writing files
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an AccountNotFoundById error
    pub fn not_found_by_id(id: AccountId) -> Self {
        LedgerError::AccountNotFoundById { id }
    }

    /// Create an AccountNotFoundByNumber error
    pub fn not_found_by_number(number: &str, role: AccountRole) -> Self {
        LedgerError::AccountNotFoundByNumber {
            number: number.to_string(),
            role,
        }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(account_number: &str, available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientBalance {
            account_number: account_number.to_string(),
            available,
            requested,
        }
    }

    /// Create a ConflictingVersion error
    pub fn conflicting_version(id: AccountId, expected: u64, actual: u64) -> Self {
        LedgerError::ConflictingVersion {
            id,
            expected,
            actual,
        }
    }

    /// Create a ConflictExhausted error
    pub fn conflict_exhausted(attempts: u32) -> Self {
        LedgerError::ConflictExhausted { attempts }
    }

    /// Create an InvalidRequest error
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        LedgerError::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Create a DuplicateAccountNumber error
    pub fn duplicate_account_number(number: &str) -> Self {
        LedgerError::DuplicateAccountNumber {
            number: number.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account_number: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account_number: account_number.to_string(),
        }
    }

    /// Create a CompensationFailed error
    pub fn compensation_failed(account_number: &str, amount: Decimal) -> Self {
        LedgerError::CompensationFailed {
            account_number: account_number.to_string(),
            amount,
        }
    }

    /// Whether retrying the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::ConflictingVersion { .. })
    }

    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::AccountNotFoundById { .. } => "ACCOUNT_NOT_FOUND_BY_ID",
            LedgerError::AccountNotFoundByNumber { .. } => "ACCOUNT_NOT_FOUND_BY_NUMBER",
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LedgerError::ConflictingVersion { .. } => "CONFLICTING_VERSION",
            LedgerError::ConflictExhausted { .. } => "CONFLICT_EXHAUSTED",
            LedgerError::InvalidRequest { .. } => "INVALID_REQUEST",
            LedgerError::DuplicateAccountNumber { .. } => "DUPLICATE_ACCOUNT_NUMBER",
            LedgerError::ArithmeticOverflow { .. } => "ARITHMETIC_OVERFLOW",
            LedgerError::CompensationFailed { .. } => "COMPENSATION_FAILED",
            LedgerError::QueueFull { .. } => "QUEUE_FULL",
            LedgerError::ExecutorShutdown => "EXECUTOR_SHUTDOWN",
            LedgerError::TaskAborted => "TASK_ABORTED",
            LedgerError::Io { .. } => "IO_ERROR",
        }
    }

    /// HTTP status a presentation layer should map this error to
    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::AccountNotFoundById { .. } | LedgerError::AccountNotFoundByNumber { .. } => {
                404
            }
            LedgerError::InsufficientBalance { .. } => 417,
            LedgerError::InvalidRequest { .. } => 400,
            LedgerError::ConflictingVersion { .. }
            | LedgerError::ConflictExhausted { .. }
            | LedgerError::DuplicateAccountNumber { .. } => 409,
            LedgerError::QueueFull { .. } | LedgerError::ExecutorShutdown => 503,
            LedgerError::ArithmeticOverflow { .. }
            | LedgerError::CompensationFailed { .. }
            | LedgerError::TaskAborted
            | LedgerError::Io { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::not_found_by_id(
        LedgerError::not_found_by_id(7),
        "Account with id 7 not found"
    )]
    #[case::not_found_sender(
        LedgerError::not_found_by_number("ACC-404", AccountRole::Sender),
        "Account ACC-404 not found (sender)"
    )]
    #[case::not_found_receiver(
        LedgerError::not_found_by_number("ACC-404", AccountRole::Receiver),
        "Account ACC-404 not found (receiver)"
    )]
    #[case::insufficient_balance(
        LedgerError::insufficient_balance("A", Decimal::new(1000, 2), Decimal::new(3000, 2)),
        "Insufficient balance on account A: available 10.00, requested 30.00"
    )]
    #[case::conflicting_version(
        LedgerError::conflicting_version(3, 1, 2),
        "Account 3 was modified concurrently: expected version 1, found 2"
    )]
    #[case::conflict_exhausted(
        LedgerError::conflict_exhausted(3),
        "Transfer abandoned after 3 conflicting attempts"
    )]
    #[case::invalid_request(
        LedgerError::invalid_request("amount must be positive"),
        "Invalid request: amount must be positive"
    )]
    #[case::compensation_failed(
        LedgerError::compensation_failed("A", Decimal::new(3000, 2)),
        "Could not restore 30.00 to account A after a failed transfer"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::not_found(LedgerError::not_found_by_id(1), 404)]
    #[case::not_found_number(LedgerError::not_found_by_number("A", AccountRole::Lookup), 404)]
    #[case::insufficient(LedgerError::insufficient_balance("A", Decimal::ZERO, Decimal::ONE), 417)]
    #[case::invalid(LedgerError::invalid_request("x"), 400)]
    #[case::exhausted(LedgerError::conflict_exhausted(3), 409)]
    #[case::shutdown(LedgerError::ExecutorShutdown, 503)]
    #[case::aborted(LedgerError::TaskAborted, 500)]
    fn test_http_status(#[case] error: LedgerError, #[case] expected: u16) {
        assert_eq!(error.http_status(), expected);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::ExecutorShutdown.code(), "EXECUTOR_SHUTDOWN");
        assert_eq!(
            LedgerError::insufficient_balance("A", Decimal::ZERO, Decimal::ONE).code(),
            "INSUFFICIENT_BALANCE"
        );
    }

    #[test]
    fn test_only_version_conflicts_are_retryable() {
        assert!(LedgerError::conflicting_version(1, 0, 1).is_retryable());
        assert!(!LedgerError::conflict_exhausted(3).is_retryable());
        assert!(!LedgerError::insufficient_balance("A", Decimal::ZERO, Decimal::ONE).is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: LedgerError = io_error.into();
        assert!(matches!(error, LedgerError::Io { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
