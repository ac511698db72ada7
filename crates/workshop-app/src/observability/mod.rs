//! Observability module for the workshop app.
//!
//! Provides the request metrics registry shared by the HTTP metrics
//! middleware, the `/status` handler and the `/metrics` endpoint.

pub mod metrics;
