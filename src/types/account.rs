//! Account-related types for the ledger
//!
//! This module defines the Account record kept by an `AccountStore`,
//! the payloads used to create and replace accounts, and the balance
//! operations the transfer engine applies.

use super::error::LedgerError;
use rust_decimal::Decimal;

/// Surrogate account identifier assigned by the store
pub type AccountId = u64;

/// Stored account record
///
/// The balance is only changed through [`Account::debit`] and
/// [`Account::credit`], which keep it non-negative and use checked
/// arithmetic. The version is owned by the store: it is bumped on every
/// successful write and compared on save to detect concurrent writers.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Surrogate id, stable for the lifetime of the record
    pub id: AccountId,

    /// Unique external key used for lookups and transfer locking
    pub account_number: String,

    /// Current balance, never negative at rest
    pub balance: Decimal,

    /// Owner display name
    pub owner_name: String,

    /// Optimistic concurrency version
    pub version: u64,
}

impl Account {
    /// Withdraw `amount` from the balance
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the balance covered the amount
    /// * `Err(LedgerError::InsufficientBalance)` if it did not; the account is untouched
    /// * `Err(LedgerError::ArithmeticOverflow)` if the subtraction overflowed
    pub fn debit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if self.balance < amount {
            return Err(LedgerError::insufficient_balance(
                &self.account_number,
                self.balance,
                amount,
            ));
        }

        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("debit", &self.account_number))?;
        Ok(())
    }

    /// Deposit `amount` into the balance
    ///
    /// # Returns
    ///
    /// * `Ok(())` on success
    /// * `Err(LedgerError::ArithmeticOverflow)` if the addition overflowed
    pub fn credit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("credit", &self.account_number))?;
        Ok(())
    }
}

/// Payload for creating an account
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub account_number: String,
    pub owner_name: String,
    pub balance: Decimal,
}

impl NewAccount {
    pub fn new(
        account_number: impl Into<String>,
        owner_name: impl Into<String>,
        balance: Decimal,
    ) -> Self {
        Self {
            account_number: account_number.into(),
            owner_name: owner_name.into(),
            balance,
        }
    }

    /// Check the payload before it reaches the store
    ///
    /// The account number must be non-blank and the opening balance
    /// must not be negative.
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_fields(&self.account_number, self.balance)
    }
}

/// Replacement values for a direct account update
///
/// Direct updates do not go through the transfer locks; the store's
/// version check is what protects them against concurrent transfers.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountUpdate {
    pub account_number: String,
    pub owner_name: String,
    pub balance: Decimal,
}

impl AccountUpdate {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_fields(&self.account_number, self.balance)
    }

    /// Apply the replacement onto a freshly read record, keeping id and version
    pub fn apply_to(self, account: &mut Account) {
        account.account_number = self.account_number;
        account.owner_name = self.owner_name;
        account.balance = self.balance;
    }
}

fn validate_fields(account_number: &str, balance: Decimal) -> Result<(), LedgerError> {
    if account_number.trim().is_empty() {
        return Err(LedgerError::invalid_request("account number must not be empty"));
    }
    if balance < Decimal::ZERO {
        return Err(LedgerError::invalid_request(format!(
            "balance must not be negative, got {}",
            balance
        )));
    }
    Ok(())
}
