//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline using predefined CSV test
//! fixtures. Each test:
//! 1. Reads accounts.csv and transfers.csv from a fixture directory
//! 2. Replays all transfers through the engine
//! 3. Generates output CSV
//! 4. Compares actual output with expected.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Happy path scenarios
//! - Business rejections (insufficient balance, unknown accounts, invalid requests)
//! - Malformed input rows
//! - Decimal precision
//! - Opposite-direction traffic on one pair
//!
//! Fixtures whose result does not depend on execution order run in both replay
//! modes; the others run sequentially only.

#[cfg(test)]
mod tests {
    use ledger_transfer_engine::cli::ReplayMode;
    use ledger_transfer_engine::replay::{replay, ReplaySummary};
    use ledger_transfer_engine::EngineConfig;
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    /// Replay a fixture and compare the output with expected.csv
    ///
    /// # Panics
    ///
    /// Panics if fixture files cannot be read or the output doesn't match.
    fn run_test_fixture(fixture_name: &str, mode: ReplayMode) -> ReplaySummary {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let accounts_path = format!("{}/accounts.csv", fixture_dir);
        let transfers_path = format!("{}/transfers.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        for path in [&accounts_path, &transfers_path, &expected_path] {
            assert!(Path::new(path).exists(), "Fixture file not found: {}", path);
        }

        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");
        let config = EngineConfig::new(4, 3, Duration::from_millis(1), None);

        let summary = replay(
            Path::new(&accounts_path),
            Path::new(&transfers_path),
            mode,
            config,
            &mut temp_output,
        )
        .unwrap_or_else(|e| panic!("Failed to replay transfers: {}", e));

        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (mode: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, mode, actual_output, expected_output
        );

        summary
    }

    /// Fixtures with order-independent results, in both modes
    #[rstest]
    #[case("happy_path")]
    #[case("insufficient_balance")]
    #[case("unknown_account")]
    #[case("invalid_requests")]
    #[case("malformed_rows")]
    #[case("precision")]
    #[case("net_zero")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(ReplayMode::Sequential, ReplayMode::Concurrent)] mode: ReplayMode,
    ) {
        run_test_fixture(fixture, mode);
    }

    /// Transfers that only succeed in file order
    #[test]
    fn test_sequential_chain() {
        let summary = run_test_fixture("sequential_chain", ReplayMode::Sequential);

        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failures.get("INSUFFICIENT_BALANCE"), Some(&1));
    }

    #[rstest]
    #[case::insufficient_balance("insufficient_balance", 2, 1, "INSUFFICIENT_BALANCE", 1, 0)]
    #[case::unknown_account("unknown_account", 3, 1, "ACCOUNT_NOT_FOUND_BY_NUMBER", 2, 0)]
    #[case::invalid_requests("invalid_requests", 4, 0, "INVALID_REQUEST", 4, 2)]
    #[case::malformed_rows("malformed_rows", 2, 1, "INSUFFICIENT_BALANCE", 1, 3)]
    fn test_fixture_summaries(
        #[case] fixture: &str,
        #[case] submitted: usize,
        #[case] succeeded: usize,
        #[case] failure_code: &str,
        #[case] failures: usize,
        #[case] skipped: usize,
    ) {
        let summary = run_test_fixture(fixture, ReplayMode::Concurrent);

        assert_eq!(summary.submitted, submitted);
        assert_eq!(summary.succeeded, succeeded);
        assert_eq!(summary.failures.get(failure_code), Some(&failures));
        assert_eq!(summary.failed(), failures);
        assert_eq!(summary.rows_skipped, skipped);
    }
}
