//! Logging setup.
//!
//! Writes structured logs to a file and human-oriented output to stdout.
//! The log file is truncated on every startup so each run reads from the
//! top. File writes go through a non-blocking worker; the returned guard
//! must stay alive for the life of the process or buffered log lines are
//! lost.

use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the non-blocking file writer flushing. Hold it until shutdown.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Directory log files are written to unless overridden.
pub fn default_log_dir() -> &'static str {
    "logs"
}

/// Log file name unless overridden.
pub fn default_log_file() -> &'static str {
    "envtracker.log"
}

/// Initializes global logging with a file layer and a stdout layer.
///
/// The filter honors `RUST_LOG` and defaults to `info`. May only be called
/// once per process.
pub fn init_logging(log_dir: &str, log_file: &str) -> Result<LoggingGuard, io::Error> {
    let log_path = prepare_log_file(log_dir, log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    tracing::debug!(path = %log_path.display(), "Logging initialized");
    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Creates the log directory and truncates the log file.
fn prepare_log_file(log_dir: &str, log_file: &str) -> Result<PathBuf, io::Error> {
    std::fs::create_dir_all(log_dir)?;
    let log_path = Path::new(log_dir).join(log_file);
    std::fs::write(&log_path, "")?;
    Ok(log_path)
}
