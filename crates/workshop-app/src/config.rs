//! Workshop app configuration.
//!
//! Configuration is loaded from environment variables. Every value has a
//! default, so an empty environment yields the stock workshop setup.

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default listen host.
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default probability that `/may-fail` answers 500.
pub const DEFAULT_FAILURE_RATE: f64 = 0.1;

/// Default `/slow` delay in seconds.
pub const DEFAULT_SLOW_DELAY_SECONDS: f64 = 2.0;

/// Default lower bound of the `/may-fail` processing delay in seconds.
pub const DEFAULT_MAY_FAIL_MIN_DELAY_SECONDS: f64 = 0.1;

/// Default upper bound of the `/may-fail` processing delay in seconds.
pub const DEFAULT_MAY_FAIL_MAX_DELAY_SECONDS: f64 = 0.5;

/// Log file tailed by the log shipper.
pub const DEFAULT_LOG_FILE: &str = "/var/log/flask-app/app.log";

/// Log filter used when `RUST_LOG` is unset. `common` carries the logging
/// fallback warning and the shutdown messages.
pub const DEFAULT_LOG_FILTER: &str = "workshop_app=info,common=info,tower_http=info";

/// Log filter used when `DEBUG` is set and `RUST_LOG` is unset.
pub const DEBUG_LOG_FILTER: &str = "workshop_app=debug,common=debug,tower_http=debug";

/// Environment variables `/env` is allowed to reveal.
pub const EXPOSED_ENV_VARS: [&str; 5] = ["PATH", "HOME", "SHELL", "USER", "PORT"];

/// Workshop app configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:5000").
    pub bind_address: String,

    /// Enables debug-level logging.
    pub debug: bool,

    /// Probability in `[0, 1]` that `/may-fail` answers 500.
    pub failure_rate: f64,

    /// How long `/slow` sleeps.
    pub slow_delay: Duration,

    /// Lower bound of the random `/may-fail` processing delay.
    pub may_fail_min_delay: Duration,

    /// Upper bound of the random `/may-fail` processing delay.
    pub may_fail_max_delay: Duration,

    /// Seed for the fault injector. Entropy-seeded when unset.
    pub fault_seed: Option<u64>,

    /// Append-only log file. `None` disables file logging.
    pub log_file: Option<PathBuf>,

    /// Graceful shutdown drain period.
    pub drain_period: Duration,

    /// Whitelisted environment variables captured at startup, served by `/env`.
    pub exposed_env: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid port configuration: {0}")]
    InvalidPort(String),

    #[error("Invalid failure rate configuration: {0}")]
    InvalidFailureRate(String),

    #[error("Invalid delay configuration: {0}")]
    InvalidDelay(String),

    #[error("Invalid fault seed configuration: {0}")]
    InvalidFaultSeed(String),

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
        let port = match vars.get("PORT") {
            Some(value_str) => value_str.trim().parse::<u16>().map_err(|e| {
                ConfigError::InvalidPort(format!(
                    "PORT must be an integer between 0 and 65535, got '{}': {}",
                    value_str, e
                ))
            })?,
            None => DEFAULT_PORT,
        };

        let host = vars
            .get("BIND_HOST")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_HOST.to_string());
        let bind_address = format!("{}:{}", host, port);

        let debug = vars
            .get("DEBUG")
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1");

        let failure_rate = match vars.get("FAILURE_RATE") {
            Some(value_str) => {
                let value: f64 = value_str.trim().parse().map_err(|e| {
                    ConfigError::InvalidFailureRate(format!(
                        "FAILURE_RATE must be a number, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::InvalidFailureRate(format!(
                        "FAILURE_RATE must be between 0.0 and 1.0, got {}",
                        value
                    )));
                }

                value
            }
            None => DEFAULT_FAILURE_RATE,
        };

        let slow_delay = parse_seconds(vars, "SLOW_DELAY", DEFAULT_SLOW_DELAY_SECONDS)?;
        let may_fail_min_delay = parse_seconds(
            vars,
            "MAY_FAIL_MIN_DELAY",
            DEFAULT_MAY_FAIL_MIN_DELAY_SECONDS,
        )?;
        let may_fail_max_delay = parse_seconds(
            vars,
            "MAY_FAIL_MAX_DELAY",
            DEFAULT_MAY_FAIL_MAX_DELAY_SECONDS,
        )?;

        if may_fail_min_delay > may_fail_max_delay {
            return Err(ConfigError::InvalidDelay(format!(
                "MAY_FAIL_MIN_DELAY ({}s) must not exceed MAY_FAIL_MAX_DELAY ({}s)",
                may_fail_min_delay.as_secs_f64(),
                may_fail_max_delay.as_secs_f64()
            )));
        }

        let fault_seed = match vars.get("FAULT_SEED") {
            Some(value_str) => Some(value_str.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidFaultSeed(format!(
                    "FAULT_SEED must be an unsigned integer, got '{}': {}",
                    value_str, e
                ))
            })?),
            None => None,
        };

        let log_file = match vars.get("LOG_FILE") {
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

        let exposed_env = EXPOSED_ENV_VARS
            .iter()
            .filter_map(|name| {
                vars.get(*name)
                    .map(|value| ((*name).to_string(), value.clone()))
            })
            .collect();

        Ok(Config {
            bind_address,
            debug,
            failure_rate,
            slow_delay,
            may_fail_min_delay,
            may_fail_max_delay,
            fault_seed,
            log_file,
            drain_period,
            exposed_env,
        })
    }

    /// Default tracing filter for this configuration.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            DEBUG_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        }
    }
}

/// Parse a non-negative duration given in (fractional) seconds.
fn parse_seconds(
    vars: &HashMap<String, String>,
    name: &str,
    default_secs: f64,
) -> Result<Duration, ConfigError> {
    let Some(value_str) = vars.get(name) else {
        return Ok(Duration::from_secs_f64(default_secs));
    };

    let secs: f64 = value_str.trim().parse().map_err(|e| {
        ConfigError::InvalidDelay(format!(
            "{} must be a number of seconds, got '{}': {}",
            name, value_str, e
        ))
    })?;

    Duration::try_from_secs_f64(secs).map_err(|e| {
        ConfigError::InvalidDelay(format!(
            "{} must be a finite, non-negative number of seconds, got {}: {}",
            name, secs, e
        ))
    })
}
