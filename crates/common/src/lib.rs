//! Common utilities shared by the monitoring workshop services.

#![warn(clippy::pedantic)]

/// Module for common error types
pub mod error;

/// Module for console and file logging setup
pub mod logging;

/// Module for graceful shutdown signal handling
pub mod shutdown;
