//! Request and response bodies for the workshop app.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version reported by the banner endpoint.
pub const APP_VERSION: &str = "1.0.0";

/// Local wall-clock time in ISO 8601 without offset, microsecond precision.
pub fn timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Response for `GET /`.
#[derive(Debug, Serialize)]
pub struct BannerResponse {
    pub message: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

/// Response for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// Generic message response. `timestamp` is omitted when `None`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: None,
        }
    }

    pub fn timestamped(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: Some(timestamp()),
        }
    }
}

/// Response for a successful `GET /may-fail`.
#[derive(Debug, Serialize)]
pub struct MayFailResponse {
    pub message: &'static str,
    pub timestamp: String,
    pub failure_rate: f64,
}

/// Response for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub active_connections: u64,
    pub total_requests: u64,
    pub error_count: u64,
    pub error_rate: f64,
    pub timestamp: String,
}

/// Response for `GET /random-joke`.
#[derive(Debug, Serialize)]
pub struct JokeResponse {
    pub joke: &'static str,
    pub timestamp: String,
}

/// Random statistics for `GET /user-stats`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserStatistics {
    pub users_online: u32,
    pub new_signups: u32,
    pub errors_logged: u64,
    pub server_load: f64,
}

/// Response for `GET /user-stats`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserStatsResponse {
    pub statistics: UserStatistics,
    pub timestamp: String,
}

/// Response for `GET /env`.
#[derive(Debug, Serialize)]
pub struct EnvResponse {
    pub environment: BTreeMap<String, String>,
    pub timestamp: String,
}

/// Body of `POST /login`. Both fields are optional on the wire so a missing
/// field maps to 400 rather than a deserialization error.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Query string of `GET /greet`.
#[derive(Debug, Deserialize)]
pub struct GreetParams {
    pub name: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp();

        // e.g. 2024-05-01T13:45:12.123456
        assert_eq!(ts.len(), 26, "unexpected timestamp {ts}");
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%dT%H:%M:%S%.6f").is_ok());
    }

    #[test]
    fn test_message_response_omits_missing_timestamp() {
        let json = serde_json::to_string(&MessageResponse::new("All systems go!")).unwrap();
        assert_eq!(json, r#"{"message":"All systems go!"}"#);

        let json = serde_json::to_string(&MessageResponse::timestamped("hi")).unwrap();
        assert!(json.contains("\"timestamp\""));
    }

    #[test]
    fn test_login_request_tolerates_missing_fields() {
        let request: LoginRequest = serde_json::from_str(r#"{"username":"a"}"#).unwrap();
        assert_eq!(request.username.as_deref(), Some("a"));
        assert!(request.password.is_none());
    }
}
