//! HTTP routes for the workshop app.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::observability::metrics::RequestMetrics;
use crate::services::FaultInjector;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Request counters and the Prometheus registry.
    pub metrics: Arc<RequestMetrics>,

    /// Failure and delay strategy for the synthetic endpoints.
    pub faults: Arc<FaultInjector>,
}

impl AppState {
    /// Build state from configuration with a fresh metrics registry.
    ///
    /// # Errors
    ///
    /// Returns error if the metrics registry cannot be built.
    pub fn new(config: Config) -> Result<Self, String> {
        let metrics = Arc::new(RequestMetrics::new()?);
        let faults = Arc::new(FaultInjector::from_config(&config));

        Ok(Self {
            config,
            metrics,
            faults,
        })
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/`, `/health`, `/status` - banner, liveness and counter snapshot
/// - `/metrics` - Prometheus exposition of the request registry
/// - `/may-fail`, `/slow`, `/sometimes-broken` - injected failures and delays
/// - `/generate-logs` - one record per log level
/// - `/login` - demo password check
/// - `/random-joke`, `/fortune`, `/dance-move`, `/user-stats`, `/env`, `/greet`
/// - CatchPanicLayer so a panicking handler still yields a 500
/// - TraceLayer for request logging
/// - HTTP metrics middleware (outermost)
pub fn build_routes(state: Arc<AppState>) -> Router {
    let metrics = Arc::clone(&state.metrics);

    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/status", get(handlers::status))
        .route("/may-fail", get(handlers::may_fail))
        .route("/slow", get(handlers::slow))
        .route("/sometimes-broken", get(handlers::sometimes_broken))
        .route("/generate-logs", get(handlers::generate_logs))
        .route("/login", post(handlers::login))
        .route("/random-joke", get(handlers::random_joke))
        .route("/fortune", get(handlers::fortune))
        .route("/dance-move", get(handlers::dance_move))
        .route("/user-stats", get(handlers::user_stats))
        .route("/env", get(handlers::env))
        .route("/greet", get(handlers::greet))
        .with_state(state)
        // Layer order (bottom-to-top execution):
        // 1. CatchPanicLayer - turn handler panics into 500 (innermost)
        // 2. TraceLayer - Log request details
        // 3. http_metrics_middleware - Record ALL responses (outermost)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        // HTTP metrics layer (outermost) - captures ALL responses including
        // framework-level errors like 404, 405 and recovered panics
        .layer(middleware::from_fn_with_state(
            metrics,
            http_metrics_middleware,
        ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn test_state(pairs: &[(&str, &str)]) -> Arc<AppState> {
        let mut vars: HashMap<String, String> = HashMap::from([
            ("LOG_FILE".to_string(), String::new()),
            ("MAY_FAIL_MIN_DELAY".to_string(), "0".to_string()),
            ("MAY_FAIL_MAX_DELAY".to_string(), "0.005".to_string()),
            ("SLOW_DELAY".to_string(), "0.01".to_string()),
            ("FAULT_SEED".to_string(), "11".to_string()),
        ]);
        for (k, v) in pairs {
            vars.insert((*k).to_string(), (*v).to_string());
        }
        let config = Config::from_vars(&vars).unwrap();
        Arc::new(AppState::new(config).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_state_is_clone() {
        // This test verifies that AppState implements Clone,
        // which is required for Axum's State extractor.
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[tokio::test]
    async fn test_every_route_is_instrumented() {
        let state = test_state(&[]);
        let app = build_routes(Arc::clone(&state));

        for uri in ["/", "/health", "/random-joke", "/fortune", "/dance-move", "/env"] {
            let (status, _) = get_json(app.clone(), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
        }

        let stats = state.metrics.snapshot();
        assert_eq!(stats.total_requests, 6);
        assert_eq!(stats.failed_requests, 0);
        assert_eq!(stats.in_flight, 0);
    }

    #[tokio::test]
    async fn test_unknown_route_is_counted_as_failure() {
        let state = test_state(&[]);
        let app = build_routes(Arc::clone(&state));

        let response = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let stats = state.metrics.snapshot();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.failed_requests, 1);
        assert!(state
            .metrics
            .render()
            .lines()
            .any(|l| l.starts_with("http_requests_total{") && l.contains("endpoint=\"unknown\"")));
    }

    #[tokio::test]
    async fn test_wrong_method_is_counted_as_unknown() {
        let state = test_state(&[]);
        let app = build_routes(Arc::clone(&state));

        let response = app
            .oneshot(Request::get("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(state.metrics.snapshot().failed_requests, 1);

        let rendered = state.metrics.render();
        assert!(rendered.lines().any(|l| l.starts_with("http_requests_total{")
            && l.contains("endpoint=\"unknown\"")
            && l.contains("status=\"405\"")));
        assert!(!rendered.contains("endpoint=\"/login\""));
    }

    #[tokio::test]
    async fn test_status_reflects_prior_requests() {
        let state = test_state(&[("FAILURE_RATE", "1.0")]);
        let app = build_routes(Arc::clone(&state));

        let (status, _) = get_json(app.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get_json(app.clone(), "/may-fail").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, body) = get_json(app, "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_requests"], 2);
        assert_eq!(body["error_count"], 1);
        assert_eq!(body["error_rate"], 50.0);
        // The /status request itself is in flight while it reports.
        assert_eq!(body["active_connections"], 1);
    }

    #[tokio::test]
    async fn test_metrics_endpoint_serves_exposition() {
        let state = test_state(&[]);
        let app = build_routes(Arc::clone(&state));

        let (status, _) = get_json(app.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);

        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/plain; version=0.0.4"));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("endpoint=\"/health\""));
        assert!(text.contains("# TYPE active_connections gauge"));
    }
}
