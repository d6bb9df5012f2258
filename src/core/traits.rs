//! Core traits for account persistence
//!
//! The transfer engine and the account service only talk to storage through
//! [`AccountStore`], so any backend providing optimistic versioning can be
//! plugged in. [`super::InMemoryAccountStore`] is the implementation shipped
//! with the crate.

use crate::types::{Account, AccountId, LedgerError, NewAccount};

/// Persistence of account records
///
/// Records are addressable by surrogate id and by unique account number.
/// Every successful write increments the record's version; a save carrying a
/// version other than the stored one fails with
/// [`LedgerError::ConflictingVersion`] and leaves the record untouched.
///
/// Implementations must be safe to call from many worker threads at once.
pub trait AccountStore: Send + Sync {
    /// Get an account by surrogate id
    fn find_by_id(&self, id: AccountId) -> Option<Account>;

    /// Get an account by account number
    fn find_by_number(&self, number: &str) -> Option<Account>;

    /// Create a new account, assigning its id and version 0
    ///
    /// Fails with `DuplicateAccountNumber` if the number is taken.
    fn insert(&self, account: NewAccount) -> Result<Account, LedgerError>;

    /// Write back a previously read account
    ///
    /// Returns the stored record with its new version.
    fn save(&self, account: Account) -> Result<Account, LedgerError>;

    /// Check whether an account with this id exists
    fn exists_by_id(&self, id: AccountId) -> bool;

    /// Delete an account, returning whether it existed
    fn delete_by_id(&self, id: AccountId) -> bool;

    /// Get all accounts
    fn find_all(&self) -> Vec<Account>;
}
