//! Completion handle for submitted transfers
//!
//! A `TransferHandle` is the receiving half of a one-shot channel whose sending
//! half travels with the transfer job. It resolves exactly once, with either a
//! receipt or the failure that stopped the transfer.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::types::{LedgerError, TransferOutcome};

/// Pending outcome of a submitted transfer
///
/// Await it from async code, or call [`TransferHandle::wait`] from a plain
/// thread. If the job is dropped without reporting (executor torn down,
/// panicking task) the handle resolves to [`LedgerError::TaskAborted`].
#[derive(Debug)]
#[must_use = "a transfer outcome is only observable through its handle"]
pub struct TransferHandle {
    receiver: oneshot::Receiver<TransferOutcome>,
}

/// Sending half kept by the transfer job
pub(crate) type Completion = oneshot::Sender<TransferOutcome>;

impl TransferHandle {
    /// Create a handle and the completion it listens to
    pub(crate) fn channel() -> (Completion, Self) {
        let (sender, receiver) = oneshot::channel();
        (sender, Self { receiver })
    }

    /// Create a handle that is already resolved
    pub(crate) fn ready(outcome: TransferOutcome) -> Self {
        let (completion, handle) = Self::channel();
        // The receiver is alive in `handle`, so this cannot fail
        let _ = completion.send(outcome);
        handle
    }

    /// Block the current thread until the transfer finishes
    ///
    /// # Panics
    ///
    /// Panics if called from within an async runtime; await the handle there.
    pub fn wait(self) -> TransferOutcome {
        self.receiver
            .blocking_recv()
            .unwrap_or(Err(LedgerError::TaskAborted))
    }

    /// Return the outcome if it is already available
    pub fn try_outcome(&mut self) -> Option<TransferOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(LedgerError::TaskAborted)),
        }
    }
}

impl Future for TransferHandle {
    type Output = TransferOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(LedgerError::TaskAborted)))
    }
}
