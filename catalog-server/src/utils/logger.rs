//! Logging Infrastructure
//!
//! Structured logging setup for development (plain text) and production (JSON).
//! `RUST_LOG` overrides the configured level when set.

use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing_subscriber::EnvFilter;

/// Log file name prefix (daily rolling: `catalog-server.YYYY-MM-DD`)
const LOG_FILE_PREFIX: &str = "catalog-server";

/// Initialize the logger with stdout output and the default level
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional JSON formatting and file output
///
/// File output is used only when `log_dir` exists.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let file_appender = log_dir
        .map(Path::new)
        .filter(|path| path.exists())
        .map(|path| tracing_appender::rolling::daily(path, LOG_FILE_PREFIX));

    match (json, file_appender) {
        (true, Some(writer)) => subscriber.json().with_writer(writer).init(),
        (true, None) => subscriber.json().init(),
        (false, Some(writer)) => subscriber.with_writer(writer).init(),
        (false, None) => subscriber.init(),
    }
}

/// Remove rolled log files older than `days`
///
/// Returns the number of removed files.
pub fn cleanup_old_logs(log_dir: &str, days: u64) -> std::io::Result<usize> {
    let max_age = Duration::from_secs(days * 24 * 60 * 60);
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(LOG_FILE_PREFIX) {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        let age = now.duration_since(modified).unwrap_or_default();
        if age > max_age {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}
