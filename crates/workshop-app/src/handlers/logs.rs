//! Log generation handler for exercising the log pipeline.

use crate::models::MessageResponse;
use axum::Json;
use tracing::{debug, error, info, warn};

/// Handler for `GET /generate-logs`.
///
/// Emits one record per level. `tracing` has no level above ERROR, so the
/// critical record is an ERROR tagged `severity = "critical"`.
pub async fn generate_logs() -> Json<MessageResponse> {
    debug!("This is a debug message");
    info!("This is an info message");
    warn!("This is a warning message");
    error!("This is an error message");
    error!(severity = "critical", "This is a critical message");

    Json(MessageResponse::timestamped(
        "Generated logs at various levels",
    ))
}
