//! Ledger service facade
//!
//! `AccountService` bundles the account operations a presentation layer needs
//! (list, read, create, update, delete, balance) with transfer submission.
//! Every failure is a [`LedgerError`] whose `http_status()` gives the status
//! to answer with.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use super::engine::TransferEngine;
use super::handle::TransferHandle;
use super::traits::AccountStore;
use crate::config::EngineConfig;
use crate::types::{Account, AccountId, AccountRole, AccountUpdate, LedgerError, NewAccount};

/// Account operations and transfers over one store
pub struct AccountService<S> {
    store: Arc<S>,
    engine: TransferEngine<S>,
}

impl<S: AccountStore + 'static> AccountService<S> {
    /// Create a service and start its transfer engine
    pub fn new(store: Arc<S>, config: EngineConfig) -> Result<Self, LedgerError> {
        let engine = TransferEngine::new(Arc::clone(&store), config)?;
        Ok(Self { store, engine })
    }

    /// Get every account
    pub fn list_accounts(&self) -> Vec<Account> {
        self.store.find_all()
    }

    /// Get an account by surrogate id
    pub fn get_account_by_id(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.store
            .find_by_id(id)
            .ok_or_else(|| LedgerError::not_found_by_id(id))
    }

    /// Get an account by account number
    pub fn get_account_by_number(&self, number: &str) -> Result<Account, LedgerError> {
        self.store
            .find_by_number(number)
            .ok_or_else(|| LedgerError::not_found_by_number(number, AccountRole::Lookup))
    }

    /// Create an account
    pub fn create_account(&self, account: NewAccount) -> Result<Account, LedgerError> {
        let created = self.store.insert(account)?;
        info!(
            id = created.id,
            account = %created.account_number,
            "Account created"
        );
        Ok(created)
    }

    /// Replace an account's number, owner and balance
    ///
    /// This write does not take the transfer locks. If a transfer commits
    /// between the read and the write, the store's version check rejects the
    /// update with [`LedgerError::ConflictingVersion`] instead of losing the
    /// transfer.
    pub fn update_account(&self, id: AccountId, update: AccountUpdate) -> Result<Account, LedgerError> {
        update.validate()?;

        let mut account = self.get_account_by_id(id)?;
        update.apply_to(&mut account);
        let saved = self.store.save(account)?;

        info!(
            id = saved.id,
            account = %saved.account_number,
            version = saved.version,
            "Account updated"
        );
        Ok(saved)
    }

    /// Delete an account
    pub fn delete_account(&self, id: AccountId) -> Result<(), LedgerError> {
        if !self.store.exists_by_id(id) || !self.store.delete_by_id(id) {
            return Err(LedgerError::not_found_by_id(id));
        }
        info!(id, "Account deleted");
        Ok(())
    }

    /// Current balance of an account
    pub fn get_balance(&self, number: &str) -> Result<Decimal, LedgerError> {
        Ok(self.get_account_by_number(number)?.balance)
    }

    /// Submit a transfer; see [`TransferEngine::submit`]
    pub fn transfer(
        &self,
        from: impl Into<String>,
        to: impl Into<String>,
        amount: Decimal,
    ) -> TransferHandle {
        self.engine.submit(from, to, amount)
    }

    /// The underlying transfer engine
    pub fn engine(&self) -> &TransferEngine<S> {
        &self.engine
    }

    /// Stop accepting transfers and wait for queued ones
    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}
