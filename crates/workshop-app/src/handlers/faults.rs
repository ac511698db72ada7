//! Handlers that inject failures and delays on purpose.
//!
//! Every decision comes from the injected `FaultInjector`. Sleeps are
//! `tokio::time::sleep`, so a stalled request parks its task without holding
//! any lock or blocking a worker thread.

use crate::errors::AppError;
use crate::models::{timestamp, MayFailResponse, MessageResponse};
use crate::routes::AppState;
use crate::services::faults::SOMETIMES_BROKEN_RATE;
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{error, info};

/// Handler for `GET /may-fail`.
///
/// Stalls for a random processing delay, then fails with the configured
/// probability.
pub async fn may_fail(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MayFailResponse>, AppError> {
    let delay = state.faults.may_fail_delay();
    tokio::time::sleep(delay).await;

    if state.faults.should_fail() {
        error!("Simulated error in may-fail endpoint");
        return Err(AppError::SimulatedFailure);
    }

    info!("may-fail endpoint succeeded");
    Ok(Json(MayFailResponse {
        message: "Success!",
        timestamp: timestamp(),
        failure_rate: state.faults.failure_rate(),
    }))
}

/// Handler for `GET /slow`.
pub async fn slow(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    let delay = state.faults.slow_delay();
    tokio::time::sleep(delay).await;

    let secs = delay.as_secs_f64();
    info!("Slow endpoint completed after {:?}s", secs);
    Json(MessageResponse::timestamped(format!(
        "Slow response after {:?}s",
        secs
    )))
}

/// Handler for `GET /sometimes-broken`.
pub async fn sometimes_broken(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, AppError> {
    if state.faults.chance(SOMETIMES_BROKEN_RATE) {
        error!("Playful random error at sometimes-broken");
        return Err(AppError::Broken);
    }

    info!("sometimes-broken endpoint successful");
    Ok(Json(MessageResponse::new("All systems go!")))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::collections::HashMap;
    use std::time::{Duration, Instant};

    fn state(pairs: &[(&str, &str)]) -> Arc<AppState> {
        let mut vars: HashMap<String, String> = HashMap::from([
            ("LOG_FILE".to_string(), String::new()),
            ("FAULT_SEED".to_string(), "21".to_string()),
        ]);
        for (k, v) in pairs {
            vars.insert((*k).to_string(), (*v).to_string());
        }
        Arc::new(AppState::new(Config::from_vars(&vars).unwrap()).unwrap())
    }

    #[tokio::test]
    async fn test_may_fail_always_fails_at_rate_one() {
        let state = state(&[
            ("FAILURE_RATE", "1.0"),
            ("MAY_FAIL_MIN_DELAY", "0"),
            ("MAY_FAIL_MAX_DELAY", "0"),
        ]);

        for _ in 0..5 {
            let result = may_fail(State(Arc::clone(&state))).await;
            assert!(matches!(result, Err(AppError::SimulatedFailure)));
        }
    }

    #[tokio::test]
    async fn test_may_fail_succeeds_at_rate_zero() {
        let state = state(&[
            ("FAILURE_RATE", "0"),
            ("MAY_FAIL_MIN_DELAY", "0"),
            ("MAY_FAIL_MAX_DELAY", "0"),
        ]);

        let Json(body) = may_fail(State(state)).await.unwrap();
        assert_eq!(body.message, "Success!");
        assert_eq!(body.failure_rate, 0.0);
    }

    #[tokio::test]
    async fn test_may_fail_waits_at_least_min_delay() {
        let state = state(&[
            ("FAILURE_RATE", "0"),
            ("MAY_FAIL_MIN_DELAY", "0.02"),
            ("MAY_FAIL_MAX_DELAY", "0.03"),
        ]);

        let started = Instant::now();
        let _ = may_fail(State(state)).await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_slow_reports_configured_delay() {
        let state = state(&[("SLOW_DELAY", "0.05")]);

        let started = Instant::now();
        let Json(body) = slow(State(state)).await;

        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(body.message, "Slow response after 0.05s");
    }

    #[tokio::test]
    async fn test_sometimes_broken_returns_both_outcomes() {
        let state = state(&[]);

        let mut broken = 0;
        let mut fine = 0;
        for _ in 0..200 {
            match sometimes_broken(State(Arc::clone(&state))).await {
                Ok(Json(body)) => {
                    assert_eq!(body.message, "All systems go!");
                    fine += 1;
                }
                Err(AppError::Broken) => broken += 1,
                Err(other) => panic!("unexpected error {other:?}"),
            }
        }

        assert!(broken > 0 && fine > broken);
    }
}
