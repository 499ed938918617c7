//! Tracing setup for the server and the command-line tool.
//!
//! The server logs to stdout and appends to a log file, `logs/lexingest.log` unless
//! [`Config::log_file`](crate::config::Config::log_file) points elsewhere. The file is written
//! through a non-blocking worker so handlers never wait on disk. The CLI logs to stderr only.
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Directory holding the default log file.
pub const DEFAULT_LOG_DIR: &str = "logs";
/// File name of the default log file.
pub const DEFAULT_LOG_FILE_NAME: &str = "lexingest.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the server subscriber: compact stdout plus the log file.
///
/// Filtering follows `RUST_LOG` and defaults to `info`. A log file that cannot be opened is
/// reported on stderr and skipped.
pub fn init_tracing(log_file: Option<&Path>) {
    let registry = tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(fmt::layer().with_target(false).compact());

    match open_log_writer(&log_path(log_file)) {
        Some(writer) => registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_ansi(false)
                    .compact(),
            )
            .init(),
        None => registry.init(),
    }
}

/// Install a stderr-only subscriber, for command-line tools whose stdout carries output.
pub fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(env_filter("warn"))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn log_path(log_file: Option<&Path>) -> PathBuf {
    log_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Path::new(DEFAULT_LOG_DIR).join(DEFAULT_LOG_FILE_NAME))
}

/// Open `path` for appending, creating its parent directories first.
fn open_log_writer(path: &Path) -> Option<NonBlocking> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if let Err(err) = fs::create_dir_all(dir) {
            eprintln!("Failed to create log directory {}: {err}", dir.display());
            return None;
        }
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(writer)
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_path_is_under_logs_dir() {
        assert_eq!(log_path(None), PathBuf::from("logs/lexingest.log"));
        assert_eq!(
            log_path(Some(Path::new("/tmp/ingest.log"))),
            PathBuf::from("/tmp/ingest.log")
        );
    }

    #[test]
    fn log_writer_creates_missing_directories() {
        let root = std::env::temp_dir().join(format!("lexingest-logs-{}", uuid::Uuid::new_v4()));
        let path = root.join("nested").join("server.log");

        assert!(open_log_writer(&path).is_some());
        assert!(path.is_file());

        fs::remove_dir_all(&root).expect("clean up log dir");
    }
}
