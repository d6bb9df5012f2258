//! Ledger Transfer Engine Library
//! # Overview
//!
//! This library moves funds between accounts concurrently. Every transfer runs
//! on a worker pool while holding the locks of both accounts involved, and the
//! store rejects stale writes through optimistic versioning.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, TransferRequest, LedgerError, etc.)
//! - [`config`] - Engine and logging configuration
//! - [`core`] - Business logic components:
//!   - [`core::lock_registry`] - One reentrant lock per account number, taken in order
//!   - [`core::engine`] - Transfer orchestration with bounded retry
//!   - [`core::executor`] - Worker pool running submitted transfers
//!   - [`core::account_store`] - In-memory versioned account records
//!   - [`core::service`] - Account operations and transfers behind one facade
//! - [`io`] - CSV reading and writing
//! - [`replay`] - Batch replay of transfer files
//! - [`cli`] - CLI arguments parsing
//! - [`logging`] - Tracing subscriber setup for the binary
//!
//! # Transfer Guarantees
//!
//! - Two transfers touching a common account never run their critical
//!   sections at the same time
//! - Locks are always taken in account-number order, so opposite-direction
//!   transfers cannot deadlock
//! - A transfer is applied completely or not at all; the sum of all balances
//!   is preserved
//! - Amounts use exact decimal arithmetic
//!
//! ```no_run
//! use std::sync::Arc;
//! use ledger_transfer_engine::{EngineConfig, InMemoryAccountStore, NewAccount, TransferEngine};
//! use ledger_transfer_engine::core::AccountStore;
//! use rust_decimal::Decimal;
//!
//! let store = Arc::new(InMemoryAccountStore::new());
//! store.insert(NewAccount::new("A", "Alice", Decimal::new(10000, 2))).unwrap();
//! store.insert(NewAccount::new("B", "Bob", Decimal::new(5000, 2))).unwrap();
//!
//! let engine = TransferEngine::new(store, EngineConfig::default()).unwrap();
//! let receipt = engine.submit("A", "B", Decimal::new(3000, 2)).wait().unwrap();
//! assert_eq!(receipt.sender_balance, Decimal::new(7000, 2));
//! ```

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod logging;
pub mod replay;
pub mod types;

pub use config::{EngineConfig, LogConfig};
pub use core::{
    AccountService, AccountStore, InMemoryAccountStore, LockRegistry, TaskExecutor,
    TransferEngine, TransferHandle,
};
pub use io::write_accounts_csv;
pub use replay::{replay, ReplaySummary};
pub use types::{
    Account, AccountId, AccountRole, AccountUpdate, LedgerError, NewAccount, TransferOutcome,
    TransferReceipt, TransferRequest, TransferStage,
};
