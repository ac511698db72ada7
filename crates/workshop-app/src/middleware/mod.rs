//! Middleware for the workshop app.
//!
//! # Components
//!
//! - `http_metrics` - Request-lifecycle instrumentation (before/after hooks)

pub mod http_metrics;

pub use http_metrics::http_metrics_middleware;
