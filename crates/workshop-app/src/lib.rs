//! Monitoring Workshop App Library
//!
//! A small instrumented HTTP service used to practise metrics, logging and
//! alerting. Every request passes through the request-lifecycle hooks, which
//! maintain in-flight, total and failed counts, the derived error rate, a
//! per-route counter and a duration histogram, all scraped from `/metrics`.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> middleware/http_metrics.rs -> handlers/*.rs -> services/faults.rs
//!                          |
//!                          v
//!              observability/metrics.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Request-lifecycle instrumentation
//! - `models` - Request and response bodies
//! - `observability` - Request metrics registry
//! - `routes` - Axum router setup
//! - `services` - Fault injection strategy

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
