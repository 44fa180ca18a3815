//! Log setup.
//!
//! The review screen owns the terminal, so logs go to a daily rolling file
//! (`ocr-labeler.log.YYYY-MM-DD`) as NDJSON. `--verbose` also writes human
//! readable lines to stderr, which is only useful for the non-interactive
//! commands.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::LabelerError;

/// Log file prefix inside the log directory.
pub const LOG_FILE_PREFIX: &str = "ocr-labeler.log";

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Keep the returned guard alive
/// for the life of the program; dropping it flushes buffered lines.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or the filter
/// directive is invalid.
pub fn init(dir: &Path, level: &str, verbose: bool) -> Result<WorkerGuard, LabelerError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        LabelerError::Config(format!("Failed to create log directory {}: {e}", dir.display()))
    })?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| LabelerError::Config(format!("Invalid log level {level:?}: {e}")))?,
    };

    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer().json().with_writer(writer).with_ansi(false);

    let console_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
            .boxed()
    });

    // A subscriber may already be installed (tests); keep the existing one.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_log_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("logs");

        let guard = init(&dir, "debug", false).unwrap();
        tracing::info!("hello");
        drop(guard);

        assert!(dir.is_dir());
    }
}
