use crate::config::{EngineConfig, LogConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Replay account transfers with per-account locking
#[derive(Parser, Debug)]
#[command(name = "ledger-engine")]
#[command(about = "Replay transfers between accounts and print the resulting balances", long_about = None)]
pub struct CliArgs {
    /// CSV file with opening accounts
    #[arg(value_name = "ACCOUNTS", help = "Path to the accounts CSV file")]
    pub accounts_file: PathBuf,

    /// CSV file with transfers to replay
    #[arg(value_name = "TRANSFERS", help = "Path to the transfers CSV file")]
    pub transfers_file: PathBuf,

    /// How transfers are handed to the engine
    #[arg(
        long = "mode",
        value_name = "MODE",
        default_value = "concurrent",
        help = "Replay mode: 'sequential' waits for each transfer, 'concurrent' submits all at once"
    )]
    pub mode: ReplayMode,

    /// Number of worker threads
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of transfer worker threads (default: 10)"
    )]
    pub workers: Option<usize>,

    /// Attempts per transfer on version conflicts
    #[arg(
        long = "max-attempts",
        value_name = "COUNT",
        help = "Attempts per transfer before giving up on version conflicts (default: 3)"
    )]
    pub max_attempts: Option<u32>,

    /// Base retry delay in milliseconds
    #[arg(
        long = "retry-backoff-ms",
        value_name = "MILLIS",
        help = "Base delay between conflicting attempts in milliseconds (default: 5, max: 1000)"
    )]
    pub retry_backoff_ms: Option<u64>,

    /// Bound of the pending-transfer queue
    #[arg(
        long = "queue-capacity",
        value_name = "COUNT",
        help = "Maximum number of queued transfers (default: unbounded)"
    )]
    pub queue_capacity: Option<usize>,

    /// Log level used when RUST_LOG is not set
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long = "json-logs")]
    pub json_logs: bool,

    /// Also write logs to this file
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Available replay modes
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReplayMode {
    Sequential,
    Concurrent,
}

impl CliArgs {
    /// Create an EngineConfig from CLI arguments
    ///
    /// Options that were not given fall back to the defaults; zero values are
    /// replaced with defaults by `EngineConfig::new`.
    pub fn to_engine_config(&self) -> EngineConfig {
        let default = EngineConfig::default();
        EngineConfig::new(
            self.workers.unwrap_or(default.worker_count),
            self.max_attempts.unwrap_or(default.max_attempts),
            self.retry_backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(default.retry_backoff),
            self.queue_capacity,
        )
    }

    /// Create a LogConfig from CLI arguments
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log_level.clone(),
            json: self.json_logs,
            log_file: self.log_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_BACKOFF, DEFAULT_WORKER_COUNT, MAX_RETRY_BACKOFF,
    };
    use rstest::rstest;

    #[test]
    fn test_positional_files() {
        let parsed = CliArgs::try_parse_from(["program", "accounts.csv", "transfers.csv"]).unwrap();

        assert_eq!(parsed.accounts_file, PathBuf::from("accounts.csv"));
        assert_eq!(parsed.transfers_file, PathBuf::from("transfers.csv"));
    }

    #[rstest]
    #[case::default_mode(&["program", "a.csv", "t.csv"], ReplayMode::Concurrent)]
    #[case::explicit_sequential(&["program", "--mode", "sequential", "a.csv", "t.csv"], ReplayMode::Sequential)]
    #[case::explicit_concurrent(&["program", "--mode", "concurrent", "a.csv", "t.csv"], ReplayMode::Concurrent)]
    fn test_mode_parsing(#[case] args: &[&str], #[case] expected: ReplayMode) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.mode, expected);
    }

    #[rstest]
    #[case::all_defaults(
        &["program", "a.csv", "t.csv"],
        DEFAULT_WORKER_COUNT,
        DEFAULT_MAX_ATTEMPTS,
        DEFAULT_RETRY_BACKOFF,
        None
    )]
    #[case::custom_workers(
        &["program", "--workers", "4", "a.csv", "t.csv"],
        4,
        DEFAULT_MAX_ATTEMPTS,
        DEFAULT_RETRY_BACKOFF,
        None
    )]
    #[case::all_custom(
        &[
            "program", "--workers", "2", "--max-attempts", "5",
            "--retry-backoff-ms", "0", "--queue-capacity", "64", "a.csv", "t.csv",
        ],
        2,
        5,
        Duration::ZERO,
        Some(64)
    )]
    #[case::backoff_clamped(
        &["program", "--retry-backoff-ms", "60000", "a.csv", "t.csv"],
        DEFAULT_WORKER_COUNT,
        DEFAULT_MAX_ATTEMPTS,
        MAX_RETRY_BACKOFF,
        None
    )]
    fn test_engine_config_conversion(
        #[case] args: &[&str],
        #[case] workers: usize,
        #[case] attempts: u32,
        #[case] backoff: Duration,
        #[case] capacity: Option<usize>,
    ) {
        let config = CliArgs::try_parse_from(args).unwrap().to_engine_config();

        assert_eq!(config.worker_count, workers);
        assert_eq!(config.max_attempts, attempts);
        assert_eq!(config.retry_backoff, backoff);
        assert_eq!(config.queue_capacity, capacity);
    }

    // Zero values should fall back to defaults
    #[rstest]
    #[case::zero_workers(&["program", "--workers", "0", "a.csv", "t.csv"], "workers")]
    #[case::zero_attempts(&["program", "--max-attempts", "0", "a.csv", "t.csv"], "attempts")]
    #[case::zero_capacity(&["program", "--queue-capacity", "0", "a.csv", "t.csv"], "capacity")]
    fn test_engine_config_zero_values_fallback(#[case] args: &[&str], #[case] field: &str) {
        let config = CliArgs::try_parse_from(args).unwrap().to_engine_config();

        match field {
            "workers" => assert_eq!(config.worker_count, DEFAULT_WORKER_COUNT),
            "attempts" => assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS),
            "capacity" => assert_eq!(config.queue_capacity, None),
            _ => panic!("Unknown field: {}", field),
        }
    }

    #[test]
    fn test_log_config_conversion() {
        let parsed = CliArgs::try_parse_from([
            "program",
            "--log-level",
            "debug",
            "--json-logs",
            "--log-file",
            "engine.log",
            "a.csv",
            "t.csv",
        ])
        .unwrap();

        let config = parsed.to_log_config();

        assert_eq!(config.level, "debug");
        assert!(config.json);
        assert_eq!(config.log_file, Some(PathBuf::from("engine.log")));
    }

    #[test]
    fn test_log_config_defaults() {
        let config = CliArgs::try_parse_from(["program", "a.csv", "t.csv"])
            .unwrap()
            .to_log_config();

        assert_eq!(config, LogConfig::default());
    }

    #[rstest]
    #[case::missing_inputs(&["program"])]
    #[case::missing_transfers(&["program", "a.csv"])]
    #[case::invalid_mode(&["program", "--mode", "invalid", "a.csv", "t.csv"])]
    #[case::non_numeric_workers(&["program", "--workers", "many", "a.csv", "t.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        let result = CliArgs::try_parse_from(args);
        assert!(result.is_err());
    }
}
