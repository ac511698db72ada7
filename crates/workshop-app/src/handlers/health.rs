//! Banner and liveness handlers.
//!
//! - `/`: static banner with version
//! - `/health`: liveness probe, always 200

use crate::models::{timestamp, BannerResponse, HealthResponse, APP_VERSION};
use axum::Json;
use tracing::info;

/// Banner handler for `GET /`.
pub async fn home() -> Json<BannerResponse> {
    info!("Home endpoint accessed");

    Json(BannerResponse {
        message: "Flask Monitoring Workshop App",
        timestamp: timestamp(),
        version: APP_VERSION,
    })
}

/// Liveness probe handler.
///
/// Does NOT check any dependencies - failure means the process is hung.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: timestamp(),
    })
}
