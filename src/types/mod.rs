//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account records and their balance operations
//! - `transfer`: Transfer requests, receipts and lifecycle stages
//! - `error`: Error types for the ledger

pub mod account;
pub mod error;
pub mod transfer;

pub use account::{Account, AccountId, AccountUpdate, NewAccount};
pub use error::{AccountRole, LedgerError};
pub use transfer::{TransferOutcome, TransferReceipt, TransferRequest, TransferStage};
