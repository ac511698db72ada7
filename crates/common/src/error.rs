//! Common error types for the workshop services.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting up logging.
#[derive(Error, Debug)]
pub enum LoggingError {
    /// The log file path has no file name component
    #[error("Invalid log file path: {0}")]
    InvalidPath(PathBuf),

    /// The log directory could not be created
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log file could not be opened for appending
    #[error("Failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A global subscriber is already installed
    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

/// Result type alias using `LoggingError`
pub type Result<T> = std::result::Result<T, LoggingError>;
