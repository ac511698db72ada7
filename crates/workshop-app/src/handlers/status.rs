//! Counter snapshot handler.

use crate::models::{timestamp, StatusResponse};
use crate::routes::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// Handler for `GET /status`.
///
/// Reports the in-flight count (which includes this request), completed
/// totals and the guarded error rate from one consistent snapshot.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let stats = state.metrics.snapshot();

    Json(StatusResponse {
        active_connections: stats.in_flight,
        total_requests: stats.total_requests,
        error_count: stats.failed_requests,
        error_rate: stats.error_rate,
        timestamp: timestamp(),
    })
}
