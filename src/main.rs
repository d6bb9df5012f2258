//! Ledger Transfer Engine CLI
//!
//! Replays a file of transfers against a file of opening accounts and prints
//! the resulting accounts.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- accounts.csv transfers.csv > result.csv
//! cargo run -- --mode sequential accounts.csv transfers.csv > result.csv
//! cargo run -- --workers 4 --max-attempts 5 --json-logs accounts.csv transfers.csv > result.csv
//! ```
//!
//! Accounts are written to stdout as CSV; logs go to stderr (and optionally a
//! file), with `RUST_LOG` overriding `--log-level`.
//!
//! # Exit Codes
//!
//! - 0: Success (individual transfer failures are logged, not fatal)
//! - 1: Error (missing arguments, file not found, output failure, etc.)

use ledger_transfer_engine::{cli, logging, replay};
use std::process;
use tracing::error;

fn main() {
    let args = cli::parse_args();

    // Held until exit so the file writer flushes
    let log_guard = logging::init_logging(&args.to_log_config());

    let mut output = std::io::stdout();
    let result = replay::replay(
        &args.accounts_file,
        &args.transfers_file,
        args.mode,
        args.to_engine_config(),
        &mut output,
    );

    if let Err(e) = result {
        error!(error = %e, "Replay failed");
        eprintln!("Error: {}", e);
        drop(log_guard);
        process::exit(1);
    }
}
