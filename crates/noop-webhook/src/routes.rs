//! HTTP routes for the webhook sink.

use crate::handlers;
use axum::{routing::post, Router};
use tower_http::trace::TraceLayer;

/// Build the sink router: `POST /noop-webhook` plus request tracing.
///
/// Any other method on the path gets the framework's 405.
pub fn build_routes() -> Router {
    Router::new()
        .route("/noop-webhook", post(handlers::noop_webhook))
        .layer(TraceLayer::new_for_http())
}
