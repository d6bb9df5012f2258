//! Thread-safe in-memory account store
//!
//! This module provides the `InMemoryAccountStore` struct, an [`AccountStore`]
//! backed by concurrent maps.
//!
//! # Design
//!
//! Records live in a `DashMap` keyed by surrogate id; a second `DashMap`
//! indexes ids by account number. DashMap's sharded locking lets writes to
//! different accounts proceed in parallel while each record's
//! check-version-then-write happens under its shard lock, so two writers can
//! never both succeed from the same version.
//!
//! # Thread Safety
//!
//! The two maps are never locked at the same time in opposite orders: a save
//! holds its record entry while touching the number index, and no path holds
//! an index entry while touching a record.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::traits::AccountStore;
use crate::types::{Account, AccountId, LedgerError, NewAccount};

/// In-memory account store with optimistic versioning
#[derive(Debug)]
pub struct InMemoryAccountStore {
    /// Account records by surrogate id
    records: DashMap<AccountId, Account>,

    /// Surrogate id by account number
    numbers: DashMap<String, AccountId>,

    /// Next id to hand out
    next_id: AtomicU64,
}

impl InMemoryAccountStore {
    /// Create a new empty store
    ///
    /// Ids are assigned from 1 upwards.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            numbers: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Claim `number` for `id` in the index
    ///
    /// Returns false if another account already owns the number.
    fn claim_number(&self, number: &str, id: AccountId) -> bool {
        let owner = *self
            .numbers
            .entry(number.to_string())
            .or_insert_with(|| id);
        owner == id
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn find_by_id(&self, id: AccountId) -> Option<Account> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    fn find_by_number(&self, number: &str) -> Option<Account> {
        let id = *self.numbers.get(number)?;
        self.find_by_id(id)
    }

    fn insert(&self, account: NewAccount) -> Result<Account, LedgerError> {
        account.validate()?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if !self.claim_number(&account.account_number, id) {
            return Err(LedgerError::duplicate_account_number(
                &account.account_number,
            ));
        }

        let stored = Account {
            id,
            account_number: account.account_number,
            balance: account.balance,
            owner_name: account.owner_name,
            version: 0,
        };
        self.records.insert(id, stored.clone());
        Ok(stored)
    }

    fn save(&self, account: Account) -> Result<Account, LedgerError> {
        let mut entry = self
            .records
            .get_mut(&account.id)
            .ok_or_else(|| LedgerError::not_found_by_id(account.id))?;
        let current = entry.value_mut();

        if current.version != account.version {
            return Err(LedgerError::conflicting_version(
                account.id,
                account.version,
                current.version,
            ));
        }

        if current.account_number != account.account_number {
            if !self.claim_number(&account.account_number, account.id) {
                return Err(LedgerError::duplicate_account_number(
                    &account.account_number,
                ));
            }
            self.numbers
                .remove_if(&current.account_number, |_, owner| *owner == account.id);
        }

        *current = Account {
            version: account.version + 1,
            ..account
        };
        Ok(current.clone())
    }

    fn exists_by_id(&self, id: AccountId) -> bool {
        self.records.contains_key(&id)
    }

    fn delete_by_id(&self, id: AccountId) -> bool {
        match self.records.remove(&id) {
            Some((_, removed)) => {
                self.numbers
                    .remove_if(&removed.account_number, |_, owner| *owner == id);
                true
            }
            None => false,
        }
    }

    fn find_all(&self) -> Vec<Account> {
        self.records
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}
