//! Per-account lock registry
//!
//! This module provides the `LockRegistry` struct, a process-wide map from
//! account number to a reentrant lock. Transfers hold the locks of both their
//! accounts for the whole read-validate-write sequence.
//!
//! # Deadlock Freedom
//!
//! A pair of locks is always acquired in lexicographic order of the account
//! numbers, whatever the direction of the transfer. A transfer A→B and a
//! transfer B→A therefore both lock A first, and no cycle of waiters can form.
//!
//! # Lifetime
//!
//! Locks are created lazily on first use and never removed, so the registry
//! grows with the number of distinct account numbers ever referenced.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

/// Shared lock guarding one account's balance
pub type AccountLock = Arc<ReentrantMutex<()>>;

/// Registry of per-account locks
#[derive(Debug, Default)]
pub struct LockRegistry {
    /// Lock by account number
    ///
    /// `entry().or_insert_with()` holds the shard lock while inserting, so two
    /// threads racing on a new key always end up sharing one lock.
    locks: DashMap<String, AccountLock>,
}

impl LockRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Get the lock for `key`, creating it if this is the first use
    pub fn lock_for(&self, key: &str) -> AccountLock {
        if let Some(lock) = self.locks.get(key) {
            return Arc::clone(lock.value());
        }
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(ReentrantMutex::new(())))
            .clone()
    }

    /// Resolve the locks of two accounts in acquisition order
    ///
    /// The lexicographically smaller key comes first. Equal keys resolve to
    /// a single lock.
    pub fn pair(&self, key_a: &str, key_b: &str) -> LockPair {
        if key_a == key_b {
            return LockPair {
                first: self.lock_for(key_a),
                second: None,
            };
        }

        let (first, second) = if key_a < key_b {
            (key_a, key_b)
        } else {
            (key_b, key_a)
        };

        LockPair {
            first: self.lock_for(first),
            second: Some(self.lock_for(second)),
        }
    }

    /// Number of distinct account numbers seen so far
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// The locks of a transfer's two accounts, in acquisition order
#[derive(Debug, Clone)]
pub struct LockPair {
    first: AccountLock,
    second: Option<AccountLock>,
}

impl LockPair {
    /// Block until both locks are held
    ///
    /// Both are released when the returned guard is dropped, on every exit
    /// path of the caller including early returns and unwinding.
    pub fn lock(&self) -> PairGuard<'_> {
        let first = self.first.lock();
        let second = self.second.as_ref().map(|lock| lock.lock());
        PairGuard {
            _second: second,
            _first: first,
        }
    }
}

/// Held locks of a [`LockPair`]
///
/// Fields drop in declaration order, so the second lock is released before
/// the first.
#[must_use = "the account locks are released as soon as the guard is dropped"]
pub struct PairGuard<'a> {
    _second: Option<ReentrantMutexGuard<'a, ()>>,
    _first: ReentrantMutexGuard<'a, ()>,
}
