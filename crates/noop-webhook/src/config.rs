//! Webhook sink configuration.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default bind address (Alertmanager points at port 8080).
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "noop_webhook.log";

/// Log filter used when `RUST_LOG` is unset. `common` carries the logging
/// fallback warning and the shutdown messages.
pub const DEFAULT_LOG_FILTER: &str = "noop_webhook=info,common=info,tower_http=info";

/// Webhook sink configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Append-only log file. `None` disables file logging.
    pub log_file: Option<PathBuf>,

    /// Graceful shutdown drain period.
    pub drain_period: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid drain period configuration: {0}")]
    InvalidDrainPeriod(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("WEBHOOK_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let log_file = match vars.get("WEBHOOK_LOG_FILE") {
            Some(path) if path.trim().is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
            None => Some(PathBuf::from(DEFAULT_LOG_FILE)),
        };

        let drain_period = match vars.get("SHUTDOWN_DRAIN_SECONDS") {
            Some(value_str) => {
                let secs: u64 = value_str.trim().parse().map_err(|e| {
                    ConfigError::InvalidDrainPeriod(format!(
                        "SHUTDOWN_DRAIN_SECONDS must be a non-negative integer, got '{}': {}",
                        value_str, e
                    ))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::ZERO,
        };

        Ok(Config {
            bind_address,
            log_file,
            drain_period,
        })
    }
}
