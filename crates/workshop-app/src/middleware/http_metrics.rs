//! HTTP metrics middleware wrapping every request with the lifecycle hooks.
//!
//! The before-hook runs before routing hands the request to a handler; the
//! after-hook runs on whatever response comes back, including framework-level
//! errors that never reach a handler:
//! - 404 Not Found
//! - 405 Method Not Allowed
//! - 500 from a panicking handler (recovered by `CatchPanicLayer` further in)
//!
//! Neither hook can fail or change the response.

use crate::observability::metrics::{RequestMetrics, UNKNOWN_ENDPOINT};
use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Middleware that records request metrics for all responses.
///
/// This captures:
/// - Request method
/// - Matched route template (`unknown` when no handler was resolved: 404, 405)
/// - Response status code
/// - Request duration
///
/// Applied as the outermost layer so every response is observed.
pub async fn http_metrics_middleware(
    State(metrics): State<Arc<RequestMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let in_flight = metrics.begin_request();

    let method = request.method().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNKNOWN_ENDPOINT, MatchedPath::as_str)
        .to_string();

    let response = next.run(request).await;

    // A wrong method matches the path but resolves no handler.
    let status = response.status();
    let endpoint = if status == StatusCode::METHOD_NOT_ALLOWED {
        UNKNOWN_ENDPOINT
    } else {
        endpoint.as_str()
    };
    in_flight.complete(&method, endpoint, status.as_u16());

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use std::time::Duration;
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    async fn handler_200() -> &'static str {
        "OK"
    }

    async fn handler_500() -> (StatusCode, &'static str) {
        (StatusCode::INTERNAL_SERVER_ERROR, "Error")
    }

    async fn handler_panic() -> &'static str {
        panic!("handler blew up");
    }

    async fn handler_slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(60)).await;
        "late"
    }

    fn test_app(metrics: Arc<RequestMetrics>) -> Router {
        Router::new()
            .route("/success", get(handler_200))
            .route("/error", get(handler_500))
            .route("/panic", get(handler_panic))
            .route("/slow", get(handler_slow))
            .layer(CatchPanicLayer::new())
            .layer(middleware::from_fn_with_state(
                metrics,
                http_metrics_middleware,
            ))
    }

    async fn send(app: Router, uri: &str) -> StatusCode {
        let request = HttpRequest::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("request builder should succeed");

        app.oneshot(request)
            .await
            .expect("request should succeed")
            .status()
    }

    #[tokio::test]
    async fn test_middleware_records_success() {
        let metrics = Arc::new(RequestMetrics::new().unwrap());

        let status = send(test_app(Arc::clone(&metrics)), "/success").await;

        assert_eq!(status, StatusCode::OK);
        let stats = metrics.snapshot();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.failed_requests, 0);
        assert_eq!(stats.in_flight, 0);
        assert!(metrics.render().contains("endpoint=\"/success\""));
    }

    #[tokio::test]
    async fn test_middleware_records_error() {
        let metrics = Arc::new(RequestMetrics::new().unwrap());

        let status = send(test_app(Arc::clone(&metrics)), "/error").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let stats = metrics.snapshot();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.failed_requests, 1);
    }

    #[tokio::test]
    async fn test_middleware_records_not_found_as_unknown() {
        let metrics = Arc::new(RequestMetrics::new().unwrap());

        let status = send(test_app(Arc::clone(&metrics)), "/nonexistent").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(metrics.snapshot().failed_requests, 1);
        assert!(metrics.render().contains("endpoint=\"unknown\""));
    }

    #[tokio::test]
    async fn test_middleware_records_wrong_method_as_unknown() {
        let metrics = Arc::new(RequestMetrics::new().unwrap());
        let request = HttpRequest::builder()
            .method("DELETE")
            .uri("/success")
            .body(Body::empty())
            .unwrap();

        let response = test_app(Arc::clone(&metrics))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let rendered = metrics.render();
        assert!(rendered.lines().any(|l| l.contains("method=\"DELETE\"")
            && l.contains("endpoint=\"unknown\"")
            && l.contains("status=\"405\"")));
        assert!(!rendered.contains("endpoint=\"/success\""));
    }

    #[tokio::test]
    async fn test_middleware_records_recovered_panic() {
        let metrics = Arc::new(RequestMetrics::new().unwrap());

        let status = send(test_app(Arc::clone(&metrics)), "/panic").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let stats = metrics.snapshot();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.failed_requests, 1);
        assert_eq!(stats.in_flight, 0);
        assert!(metrics
            .render()
            .lines()
            .any(|l| l.contains("endpoint=\"/panic\"") && l.contains("status=\"500\"")));
    }

    #[tokio::test]
    async fn test_cancelled_request_releases_in_flight() {
        let metrics = Arc::new(RequestMetrics::new().unwrap());
        let app = test_app(Arc::clone(&metrics));

        let pending = tokio::spawn(send(app, "/slow"));
        while metrics.snapshot().in_flight == 0 {
            tokio::task::yield_now().await;
        }

        pending.abort();
        let _ = pending.await;

        let stats = metrics.snapshot();
        assert_eq!(stats.in_flight, 0);
        assert_eq!(stats.total_requests, 0);
    }
}
