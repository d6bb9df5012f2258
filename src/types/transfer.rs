//! Transfer-related types for the ledger
//!
//! This module defines the request accepted by the transfer engine, the
//! receipt it produces, and the lifecycle stages a transfer task moves through.

use rust_decimal::Decimal;
use std::fmt;

use super::error::LedgerError;

/// Result delivered through a transfer's completion handle
pub type TransferOutcome = Result<TransferReceipt, LedgerError>;

/// A validated request to move `amount` from one account to another
///
/// Construction rejects non-positive amounts, blank account numbers and
/// transfers from an account to itself, so a `TransferRequest` that exists
/// can go straight to lock acquisition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    /// Account number to debit
    pub from: String,
    /// Account number to credit
    pub to: String,
    /// Amount to move, strictly positive
    pub amount: Decimal,
}

impl TransferRequest {
    /// Build and validate a transfer request
    ///
    /// # Returns
    ///
    /// * `Ok(TransferRequest)` if the request may proceed
    /// * `Err(LedgerError::InvalidRequest)` otherwise
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        amount: Decimal,
    ) -> Result<Self, LedgerError> {
        let from = from.into();
        let to = to.into();

        if from.trim().is_empty() || to.trim().is_empty() {
            return Err(LedgerError::invalid_request("account number must not be empty"));
        }
        if from == to {
            return Err(LedgerError::invalid_request(format!(
                "cannot transfer from account {} to itself",
                from
            )));
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_request(format!(
                "amount must be positive, got {}",
                amount
            )));
        }

        Ok(Self { from, to, amount })
    }
}

/// Confirmation of a completed transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    /// Sender balance after the debit
    pub sender_balance: Decimal,
    /// Receiver balance after the credit
    pub receiver_balance: Decimal,
    /// Attempts needed, 1 unless version conflicts forced a retry
    pub attempts: u32,
}

impl TransferReceipt {
    /// Human-readable confirmation message
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TransferReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer of {} from {} to {} completed successfully",
            self.amount, self.from, self.to
        )
    }
}

/// Lifecycle of a transfer task
///
/// `Submitted → LocksAcquired → Validated → Persisted → Completed`, or a
/// `Failed` terminal state reached from any earlier stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    Submitted,
    LocksAcquired,
    Validated,
    Persisted,
    Completed,
    Failed,
}

impl TransferStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStage::Completed | TransferStage::Failed)
    }
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferStage::Submitted => "SUBMITTED",
            TransferStage::LocksAcquired => "LOCKS_ACQUIRED",
            TransferStage::Validated => "VALIDATED",
            TransferStage::Persisted => "PERSISTED",
            TransferStage::Completed => "COMPLETED",
            TransferStage::Failed => "FAILED",
        };
        write!(f, "{}", name)
    }
}
