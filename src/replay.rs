//! Batch replay of transfer files
//!
//! This module drives the engine from CSV input: it loads opening accounts into
//! an in-memory store, submits every transfer row, waits for all outcomes and
//! writes the resulting accounts as CSV.
//!
//! # Modes
//!
//! - **Sequential**: each transfer is awaited before the next one is submitted,
//!   so outcomes follow file order exactly
//! - **Concurrent**: all transfers are submitted up front and awaited together
//!   on a tokio runtime; only transfers sharing an account are serialized

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::cli::ReplayMode;
use crate::config::EngineConfig;
use crate::core::{AccountStore, InMemoryAccountStore, TransferEngine, TransferHandle};
use crate::io::{write_accounts_csv, SyncReader, TransferRow};
use crate::types::{NewAccount, TransferOutcome};

/// Counters describing one replay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    /// Accounts created from the accounts file
    pub accounts_loaded: usize,
    /// Rows skipped because they could not be parsed or stored
    pub rows_skipped: usize,
    /// Transfers handed to the engine
    pub submitted: usize,
    /// Transfers that completed
    pub succeeded: usize,
    /// Transfers that failed, by error code
    pub failures: BTreeMap<&'static str, usize>,
}

impl ReplaySummary {
    /// Total number of failed transfers
    pub fn failed(&self) -> usize {
        self.failures.values().sum()
    }

    fn record(&mut self, outcome: TransferOutcome) {
        match outcome {
            Ok(_) => self.succeeded += 1,
            Err(e) => *self.failures.entry(e.code()).or_default() += 1,
        }
    }
}

/// Replay `transfers_path` against the accounts in `accounts_path`
///
/// # Returns
///
/// * `Ok(ReplaySummary)` once every transfer has an outcome and the accounts
///   were written to `output`
/// * `Err(String)` on fatal errors (missing file, engine start-up, output I/O)
pub fn replay(
    accounts_path: &Path,
    transfers_path: &Path,
    mode: ReplayMode,
    config: EngineConfig,
    output: &mut dyn Write,
) -> Result<ReplaySummary, String> {
    let store = Arc::new(InMemoryAccountStore::new());
    let mut summary = ReplaySummary::default();

    for result in SyncReader::<NewAccount>::new(accounts_path)? {
        match result.and_then(|account| store.insert(account).map_err(|e| e.to_string())) {
            Ok(_) => summary.accounts_loaded += 1,
            Err(e) => {
                warn!(error = %e, "Skipping account row");
                summary.rows_skipped += 1;
            }
        }
    }

    let engine = TransferEngine::new(Arc::clone(&store), config)
        .map_err(|e| format!("Failed to start transfer engine: {}", e))?;
    let rows = SyncReader::<TransferRow>::new(transfers_path)?;

    match mode {
        ReplayMode::Sequential => {
            for result in rows {
                match result {
                    Ok(row) => {
                        summary.submitted += 1;
                        summary.record(engine.submit(row.from, row.to, row.amount).wait());
                    }
                    Err(e) => {
                        warn!(error = %e, "Skipping transfer row");
                        summary.rows_skipped += 1;
                    }
                }
            }
        }
        ReplayMode::Concurrent => {
            let mut handles: Vec<TransferHandle> = Vec::new();
            for result in rows {
                match result {
                    Ok(row) => handles.push(engine.submit(row.from, row.to, row.amount)),
                    Err(e) => {
                        warn!(error = %e, "Skipping transfer row");
                        summary.rows_skipped += 1;
                    }
                }
            }
            summary.submitted = handles.len();

            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;
            for outcome in runtime.block_on(futures::future::join_all(handles)) {
                summary.record(outcome);
            }
        }
    }

    engine.shutdown();

    write_accounts_csv(&store.find_all(), output)?;

    info!(
        accounts = summary.accounts_loaded,
        submitted = summary.submitted,
        succeeded = summary.succeeded,
        failed = summary.failed(),
        skipped = summary.rows_skipped,
        "Replay finished"
    );

    Ok(summary)
}
