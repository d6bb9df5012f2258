//! Tracing subscriber setup for the binary
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the executable. Logs go to stderr so that stdout carries nothing but the
//! account CSV.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogConfig;

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `config.level`. When a log file is
/// configured, the returned guard must be kept alive until exit so buffered
/// lines are flushed.
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_writer, guard) = match config.log_file.as_deref() {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path));
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        let stderr_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr);
        let file_layer = file_writer.map(|writer| {
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(writer)
                .with_ansi(false)
        });
        registry.with(stderr_layer).with(file_layer).init();
    } else {
        let stderr_layer = fmt::layer()
            .with_target(false)
            .with_thread_names(true)
            .with_writer(std::io::stderr);
        let file_layer = file_writer.map(|writer| {
            fmt::layer()
                .with_target(false)
                .with_thread_names(true)
                .with_writer(writer)
                .with_ansi(false)
        });
        registry.with(stderr_layer).with(file_layer).init();
    }

    guard
}

fn file_appender(path: &Path) -> tracing_appender::rolling::RollingFileAppender {
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "ledger-engine.log".into());

    tracing_appender::rolling::never(directory, file_name)
}
