//! Runtime configuration
//!
//! `EngineConfig` tunes the transfer engine's worker pool and retry policy;
//! `LogConfig` controls the tracing subscriber installed by the binary.
//! Both are normally built from CLI arguments.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Default number of transfer worker threads
pub const DEFAULT_WORKER_COUNT: usize = 10;

/// Default number of attempts per transfer when the store reports conflicts
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay between conflicting attempts
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(5);

/// Upper bound of any single retry delay; account locks are held while waiting
pub const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Configuration of the transfer engine
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Number of worker threads running transfers
    pub worker_count: usize,
    /// Attempts per transfer before giving up on version conflicts
    pub max_attempts: u32,
    /// Base delay before a retry; attempt `n` waits `n * retry_backoff`
    pub retry_backoff: Duration,
    /// Bound of the pending-transfer queue, `None` for unbounded
    pub queue_capacity: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            queue_capacity: None,
        }
    }
}

impl EngineConfig {
    /// Create an EngineConfig with custom values
    ///
    /// Zero worker counts, attempt bounds and queue capacities are replaced by
    /// their defaults with a warning. A retry backoff above
    /// [`MAX_RETRY_BACKOFF`] is clamped to it.
    pub fn new(
        worker_count: usize,
        max_attempts: u32,
        retry_backoff: Duration,
        queue_capacity: Option<usize>,
    ) -> Self {
        let default = Self::default();

        let worker_count = if worker_count == 0 {
            warn!(
                worker_count,
                default = default.worker_count,
                "Invalid worker_count, using default"
            );
            default.worker_count
        } else {
            worker_count
        };

        let max_attempts = if max_attempts == 0 {
            warn!(
                max_attempts,
                default = default.max_attempts,
                "Invalid max_attempts, using default"
            );
            default.max_attempts
        } else {
            max_attempts
        };

        let retry_backoff = if retry_backoff > MAX_RETRY_BACKOFF {
            warn!(
                retry_backoff_ms = retry_backoff.as_millis() as u64,
                max_ms = MAX_RETRY_BACKOFF.as_millis() as u64,
                "retry_backoff too large, clamping"
            );
            MAX_RETRY_BACKOFF
        } else {
            retry_backoff
        };

        let queue_capacity = match queue_capacity {
            Some(0) => {
                warn!("Invalid queue_capacity (0), using an unbounded queue");
                None
            }
            other => other,
        };

        Self {
            worker_count,
            max_attempts,
            retry_backoff,
            queue_capacity,
        }
    }
}

/// Configuration of the tracing subscriber
#[derive(Clone, Debug, PartialEq)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is not set, e.g. `info`
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
    /// Also write logs to this file
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_engine_config() {
        let config = EngineConfig::default();
        assert_eq!(config.worker_count, 10);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_backoff, Duration::from_millis(5));
        assert_eq!(config.queue_capacity, None);
    }

    #[rstest]
    #[case::all_custom(4, 5, Some(100), 4, 5, Some(100))]
    #[case::zero_workers(0, 5, None, 10, 5, None)]
    #[case::zero_attempts(4, 0, None, 4, 3, None)]
    #[case::zero_capacity(4, 5, Some(0), 4, 5, None)]
    fn test_engine_config_zero_values_fallback(
        #[case] workers: usize,
        #[case] attempts: u32,
        #[case] capacity: Option<usize>,
        #[case] expected_workers: usize,
        #[case] expected_attempts: u32,
        #[case] expected_capacity: Option<usize>,
    ) {
        let config = EngineConfig::new(workers, attempts, Duration::ZERO, capacity);

        assert_eq!(config.worker_count, expected_workers);
        assert_eq!(config.max_attempts, expected_attempts);
        assert_eq!(config.queue_capacity, expected_capacity);
    }

    #[rstest]
    #[case::default(DEFAULT_RETRY_BACKOFF, DEFAULT_RETRY_BACKOFF)]
    #[case::at_bound(MAX_RETRY_BACKOFF, MAX_RETRY_BACKOFF)]
    #[case::above_bound(Duration::from_secs(60), MAX_RETRY_BACKOFF)]
    #[case::huge(Duration::from_millis(u64::MAX), MAX_RETRY_BACKOFF)]
    fn test_engine_config_clamps_retry_backoff(
        #[case] backoff: Duration,
        #[case] expected: Duration,
    ) {
        let config = EngineConfig::new(4, 3, backoff, None);
        assert_eq!(config.retry_backoff, expected);
    }
}
