//! Core business logic module
//!
//! This module contains the transfer processing components:
//! - `traits` - The `AccountStore` persistence abstraction
//! - `account_store` - Thread-safe in-memory `AccountStore`
//! - `lock_registry` - Per-account reentrant locks with ordered pair acquisition
//! - `executor` - Fixed worker pool running transfer jobs
//! - `handle` - Completion handle returned to transfer callers
//! - `engine` - Transfer orchestration with bounded retry on version conflicts
//! - `service` - Account operations and transfers behind one facade

pub mod account_store;
pub mod engine;
pub mod executor;
pub mod handle;
pub mod lock_registry;
pub mod service;
pub mod traits;

pub use account_store::InMemoryAccountStore;
pub use engine::TransferEngine;
pub use executor::TaskExecutor;
pub use handle::TransferHandle;
pub use lock_registry::{AccountLock, LockPair, LockRegistry, PairGuard};
pub use service::AccountService;
pub use traits::AccountStore;
