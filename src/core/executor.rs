//! Bounded worker pool for transfer tasks
//!
//! This module provides the `TaskExecutor` struct, which runs submitted jobs on
//! a fixed set of worker threads fed by a shared queue.
//!
//! # Design
//!
//! Transfer jobs block: they wait on account locks and on the store. They run
//! on dedicated OS threads rather than on an async runtime's workers, so a
//! caller awaiting a transfer on a tokio runtime never has its reactor threads
//! stalled by lock waits.
//!
//! ```text
//! submit() ──► crossbeam channel ──► transfer-worker-0 ┐
//!                                 ──► transfer-worker-1 ├─ job()
//!                                 ──► transfer-worker-N ┘
//! ```
//!
//! # Shutdown
//!
//! `shutdown()` closes the queue; workers keep draining it and exit once it is
//! empty, then are joined. Jobs already queued therefore still run.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::types::LedgerError;

/// Unit of work run by a worker
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size worker pool with a shared job queue
#[derive(Debug)]
pub struct TaskExecutor {
    /// Queue sender, `None` once shut down
    sender: Mutex<Option<Sender<Job>>>,

    /// Worker threads, drained by `shutdown`
    workers: Mutex<Vec<JoinHandle<()>>>,

    /// Bound of the queue, `None` for unbounded
    queue_capacity: Option<usize>,
}

impl TaskExecutor {
    /// Start `worker_count` workers
    ///
    /// # Arguments
    ///
    /// * `worker_count` - Number of worker threads (at least one is started)
    /// * `queue_capacity` - `Some(n)` to reject submissions when `n` jobs are
    ///   waiting, `None` for an unbounded queue
    ///
    /// # Returns
    ///
    /// * `Ok(TaskExecutor)` once every worker is running
    /// * `Err(LedgerError::Io)` if a thread could not be spawned
    pub fn new(worker_count: usize, queue_capacity: Option<usize>) -> Result<Self, LedgerError> {
        let (sender, receiver) = match queue_capacity {
            Some(capacity) => crossbeam_channel::bounded(capacity),
            None => crossbeam_channel::unbounded(),
        };

        let worker_count = worker_count.max(1);
        let mut workers = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("transfer-worker-{}", index))
                .spawn(move || worker_loop(index, receiver))?;
            workers.push(handle);
        }

        info!(
            workers = worker_count,
            queue_capacity = ?queue_capacity,
            "Task executor started"
        );

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            queue_capacity,
        })
    }

    /// Queue a job without blocking
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the job was queued
    /// * `Err(LedgerError::QueueFull)` if the bounded queue is full
    /// * `Err(LedgerError::ExecutorShutdown)` after `shutdown`
    pub fn submit(&self, job: Job) -> Result<(), LedgerError> {
        let sender = self.sender.lock();
        let sender = sender.as_ref().ok_or(LedgerError::ExecutorShutdown)?;

        sender.try_send(job).map_err(|e| match e {
            TrySendError::Full(_) => LedgerError::QueueFull {
                capacity: self.queue_capacity.unwrap_or_default(),
            },
            TrySendError::Disconnected(_) => LedgerError::ExecutorShutdown,
        })
    }

    /// Number of jobs waiting for a worker
    pub fn queued(&self) -> usize {
        self.sender.lock().as_ref().map_or(0, |sender| sender.len())
    }

    pub fn is_shutdown(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Stop accepting jobs and wait for the queue to drain
    ///
    /// Safe to call more than once; later calls return immediately.
    pub fn shutdown(&self) {
        let Some(sender) = self.sender.lock().take() else {
            return;
        };
        let pending = sender.len();
        drop(sender);

        info!(pending, "Task executor shutting down");

        let workers: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        for worker in workers {
            if worker.join().is_err() {
                error!("Worker thread exited abnormally");
            }
        }

        info!("Task executor stopped");
    }
}

impl Drop for TaskExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(index: usize, receiver: Receiver<Job>) {
    debug!(worker = index, "Worker started");

    // recv fails only once the queue is closed and empty
    while let Ok(job) = receiver.recv() {
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            error!(worker = index, "Task panicked");
        }
    }

    debug!(worker = index, "Worker stopped");
}
