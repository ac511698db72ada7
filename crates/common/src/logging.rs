//! Logging setup shared by both services.
//!
//! Every service logs to the console. When a log file is configured, the same
//! records are also appended to that file, one timestamped line per event,
//! through a non-blocking writer. The external log shipper tails that file, so
//! it is only ever opened in append mode and never truncated or rotated here.
//!
//! The returned [`LoggingGuard`] owns the background writer thread. Dropping it
//! flushes any buffered lines, so `main` must hold it until shutdown.

use crate::error::{LoggingError, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the file writer alive for the lifetime of the process.
#[must_use = "dropping the guard stops the file writer"]
pub struct LoggingGuard {
    file_writer: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// Whether records are also being written to a log file.
    pub fn file_logging_enabled(&self) -> bool {
        self.file_writer.is_some()
    }
}

/// Install the global tracing subscriber.
///
/// `default_filter` is used when `RUST_LOG` is unset. A log file that cannot be
/// opened does not stop the service: it falls back to console-only output and
/// emits a warning once the subscriber is up.
///
/// # Errors
///
/// Returns [`LoggingError::Subscriber`] if a global subscriber is already set.
pub fn init_logging(default_filter: &str, log_file: Option<&Path>) -> Result<LoggingGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let mut file_error = None;
    let mut file_guard = None;
    let file_layer = match log_file.map(open_append) {
        Some(Ok(file)) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            file_guard = Some(guard);
            Some(fmt::layer().with_ansi(false).with_writer(writer))
        }
        Some(Err(e)) => {
            file_error = Some(e);
            None
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Subscriber(e.to_string()))?;

    if let Some(e) = file_error {
        tracing::warn!(error = %e, "File logging disabled, continuing with console output only");
    }

    Ok(LoggingGuard {
        file_writer: file_guard,
    })
}

/// Open `path` for appending, creating it and any missing parent directories.
///
/// # Errors
///
/// Returns an error if the path has no file name, the directory cannot be
/// created, or the file cannot be opened.
pub fn open_append(path: &Path) -> Result<File> {
    if path.file_name().is_none() {
        return Err(LoggingError::InvalidPath(path.to_path_buf()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| LoggingError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}
