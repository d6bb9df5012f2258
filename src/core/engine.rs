//! Concurrent transfer engine
//!
//! This module provides the `TransferEngine` struct, which moves funds between
//! two accounts on a worker pool and reports the outcome through a
//! [`TransferHandle`].
//!
//! # Architecture
//!
//! ```text
//! TransferEngine
//!     ├── TaskExecutor             (worker threads running transfer jobs)
//!     └── Arc<TransferCore>        (shared with every job)
//!         ├── Arc<S: AccountStore> (records with optimistic versioning)
//!         └── LockRegistry         (one reentrant lock per account number)
//! ```
//!
//! # Transfer Algorithm
//!
//! Inside a worker, a transfer:
//! 1. Locks both accounts in account-number order
//! 2. Reads sender and receiver
//! 3. Checks the sender's balance covers the amount
//! 4. Saves the debited sender, then the credited receiver
//! 5. On a version conflict, re-reads and tries again while still holding the
//!    locks, up to `max_attempts` times, waiting `attempt * retry_backoff`
//!    between attempts
//! 6. Releases the locks and resolves the handle
//!
//! If the receiver write fails after the sender write succeeded, the debit is
//! reverted before the failure is retried or reported, so a transfer never
//! leaves only one half applied.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use super::executor::TaskExecutor;
use super::handle::TransferHandle;
use super::lock_registry::LockRegistry;
use super::traits::AccountStore;
use crate::config::{EngineConfig, MAX_RETRY_BACKOFF};
use crate::types::{
    Account, AccountRole, LedgerError, TransferOutcome, TransferReceipt, TransferRequest,
    TransferStage,
};

/// Transfer orchestrator with a non-blocking submission API
///
/// Dropping the engine shuts its worker pool down after the queued transfers
/// have run.
pub struct TransferEngine<S> {
    core: Arc<TransferCore<S>>,
    executor: TaskExecutor,
}

/// State shared by every transfer job
struct TransferCore<S> {
    store: Arc<S>,
    locks: LockRegistry,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl<S: AccountStore + 'static> TransferEngine<S> {
    /// Create an engine over `store` and start its workers
    ///
    /// # Returns
    ///
    /// * `Ok(TransferEngine)` once the worker pool is running
    /// * `Err(LedgerError::Io)` if a worker thread could not be spawned
    pub fn new(store: Arc<S>, config: EngineConfig) -> Result<Self, LedgerError> {
        let executor = TaskExecutor::new(config.worker_count, config.queue_capacity)?;
        let core = Arc::new(TransferCore {
            store,
            locks: LockRegistry::new(),
            max_attempts: config.max_attempts.max(1),
            retry_backoff: config.retry_backoff,
        });

        Ok(Self { core, executor })
    }

    /// Submit a transfer without waiting for it
    ///
    /// Invalid requests (non-positive amount, self-transfer, blank account
    /// number) and submissions the executor refuses resolve the handle
    /// immediately, without touching any lock or record.
    pub fn submit(
        &self,
        from: impl Into<String>,
        to: impl Into<String>,
        amount: Decimal,
    ) -> TransferHandle {
        match TransferRequest::new(from, to, amount) {
            Ok(request) => self.submit_request(request),
            Err(e) => {
                debug!(error = %e, "Transfer rejected before submission");
                TransferHandle::ready(Err(e))
            }
        }
    }

    /// Submit an already validated request
    pub fn submit_request(&self, request: TransferRequest) -> TransferHandle {
        let (completion, handle) = TransferHandle::channel();
        let core = Arc::clone(&self.core);

        debug!(
            from = %request.from,
            to = %request.to,
            amount = %request.amount,
            stage = %TransferStage::Submitted,
            "Transfer submitted"
        );

        let submitted = self.executor.submit(Box::new(move || {
            let outcome = core.execute(&request);
            log_outcome(&request, &outcome);
            // The caller may have dropped its handle; nothing to deliver then
            let _ = completion.send(outcome);
        }));

        match submitted {
            Ok(()) => handle,
            Err(e) => {
                warn!(error = %e, "Transfer not queued");
                TransferHandle::ready(Err(e))
            }
        }
    }

    /// Run a transfer on the calling thread
    ///
    /// Takes the same locks and follows the same retry policy as submitted
    /// transfers, so it is safe to mix with them.
    pub fn transfer_blocking(&self, request: &TransferRequest) -> TransferOutcome {
        let outcome = self.core.execute(request);
        log_outcome(request, &outcome);
        outcome
    }

    /// The store the engine reads and writes
    pub fn store(&self) -> &Arc<S> {
        &self.core.store
    }

    /// The account locks used by transfers
    pub fn locks(&self) -> &LockRegistry {
        &self.core.locks
    }

    /// Number of transfers waiting for a worker
    pub fn pending(&self) -> usize {
        self.executor.queued()
    }

    /// Stop accepting transfers and wait for queued ones to finish
    ///
    /// Later submissions resolve with [`LedgerError::ExecutorShutdown`].
    pub fn shutdown(&self) {
        self.executor.shutdown();
    }
}

impl<S: AccountStore> TransferCore<S> {
    /// Run one transfer to completion while holding both account locks
    fn execute(&self, request: &TransferRequest) -> TransferOutcome {
        let pair = self.locks.pair(&request.from, &request.to);
        let _guard = pair.lock();

        debug!(
            from = %request.from,
            to = %request.to,
            stage = %TransferStage::LocksAcquired,
            "Account locks acquired"
        );

        let mut attempt = 1;
        loop {
            match self.attempt(request, attempt) {
                Err(e) if e.is_retryable() => {
                    if attempt >= self.max_attempts {
                        warn!(
                            from = %request.from,
                            to = %request.to,
                            attempts = attempt,
                            error = %e,
                            "Transfer retries exhausted"
                        );
                        return Err(LedgerError::conflict_exhausted(attempt));
                    }

                    debug!(
                        from = %request.from,
                        to = %request.to,
                        attempt,
                        error = %e,
                        "Version conflict, retrying transfer"
                    );
                    self.backoff(attempt);
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    /// One read-validate-write pass
    fn attempt(&self, request: &TransferRequest, attempt: u32) -> TransferOutcome {
        let mut sender = self
            .store
            .find_by_number(&request.from)
            .ok_or_else(|| LedgerError::not_found_by_number(&request.from, AccountRole::Sender))?;
        let mut receiver = self
            .store
            .find_by_number(&request.to)
            .ok_or_else(|| LedgerError::not_found_by_number(&request.to, AccountRole::Receiver))?;

        sender.debit(request.amount)?;
        receiver.credit(request.amount)?;

        debug!(
            from = %request.from,
            to = %request.to,
            attempt,
            stage = %TransferStage::Validated,
            "Balances validated"
        );

        let saved_sender = self.store.save(sender)?;
        let saved_receiver = match self.store.save(receiver) {
            Ok(saved) => saved,
            Err(e) => {
                self.revert_debit(&saved_sender, request.amount)?;
                return Err(e);
            }
        };

        debug!(
            from = %request.from,
            to = %request.to,
            attempt,
            stage = %TransferStage::Persisted,
            "Balances persisted"
        );

        Ok(TransferReceipt {
            from: request.from.clone(),
            to: request.to.clone(),
            amount: request.amount,
            sender_balance: saved_sender.balance,
            receiver_balance: saved_receiver.balance,
            attempts: attempt,
        })
    }

    /// Credit `amount` back to a sender whose debit was already persisted
    ///
    /// The sender is re-read after each conflict so a write made outside the
    /// account locks in the meantime is kept.
    fn revert_debit(&self, debited: &Account, amount: Decimal) -> Result<(), LedgerError> {
        let mut current = debited.clone();

        for attempt in 1..=self.max_attempts {
            let mut restored = current;
            if let Err(e) = restored.credit(amount) {
                warn!(
                    account = %debited.account_number,
                    error = %e,
                    "Revert credit overflowed"
                );
                break;
            }

            match self.store.save(restored) {
                Ok(_) => {
                    warn!(
                        account = %debited.account_number,
                        amount = %amount,
                        "Reverted debit after failed credit"
                    );
                    return Ok(());
                }
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    match self.store.find_by_id(debited.id) {
                        Some(fresh) => current = fresh,
                        None => break,
                    }
                }
                Err(_) => break,
            }
        }

        error!(
            account = %debited.account_number,
            amount = %amount,
            "Failed to revert debit, ledger needs reconciliation"
        );
        Err(LedgerError::compensation_failed(
            &debited.account_number,
            amount,
        ))
    }

    fn backoff(&self, attempt: u32) {
        let delay = self.backoff_delay(attempt);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    /// Wait before attempt `attempt + 1`, capped at [`MAX_RETRY_BACKOFF`]
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.retry_backoff
            .saturating_mul(attempt)
            .min(MAX_RETRY_BACKOFF)
    }
}

fn log_outcome(request: &TransferRequest, outcome: &TransferOutcome) {
    match outcome {
        Ok(receipt) => info!(
            from = %request.from,
            to = %request.to,
            amount = %request.amount,
            attempts = receipt.attempts,
            stage = %TransferStage::Completed,
            "{}",
            receipt
        ),
        Err(e) => warn!(
            from = %request.from,
            to = %request.to,
            amount = %request.amount,
            code = e.code(),
            stage = %TransferStage::Failed,
            "Transfer failed: {}",
            e
        ),
    }
}
