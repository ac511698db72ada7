//! Prometheus metrics endpoint handler.
//!
//! This endpoint is unauthenticated so Prometheus can scrape it. It is
//! read-only; the scrape itself is counted by the metrics middleware like any
//! other request.

use crate::routes::AppState;
use axum::{extract::State, http::header, response::IntoResponse};
use std::sync::Arc;

/// Content type of the Prometheus text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Handler for GET /metrics
///
/// Returns 200 OK with Prometheus text format:
/// ```text
/// # HELP http_requests_total Total HTTP requests
/// # TYPE http_requests_total counter
/// http_requests_total{method="GET",endpoint="/health",status="200"} 42
/// ```
#[tracing::instrument(skip_all, name = "workshop.metrics.scrape")]
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render(),
    )
}
