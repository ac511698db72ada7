//! Demo login handler.
//!
//! There is no user store: any username is accepted as long as the password
//! is the fixed workshop password.

use crate::errors::AppError;
use crate::models::{LoginRequest, MessageResponse};
use axum::{body::Bytes, Json};
use tracing::{info, warn};

/// The only password `/login` accepts.
pub const DEMO_PASSWORD: &str = "password123";

/// Handler for `POST /login`.
///
/// A body that is not a JSON object, or one missing either field (or with an
/// empty one), is answered with 400 rather than a parse error.
pub async fn login(body: Bytes) -> Result<Json<MessageResponse>, AppError> {
    let request: LoginRequest = serde_json::from_slice(&body).unwrap_or_default();

    let (Some(username), Some(password)) = (
        request.username.filter(|u| !u.is_empty()),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        warn!("Login attempt with missing username or password");
        return Err(AppError::MissingCredentials);
    };

    if password == DEMO_PASSWORD {
        info!(username = %username, "User logged in successfully");
        Ok(Json(MessageResponse::new(format!("Welcome, {}!", username))))
    } else {
        warn!(username = %username, "Failed login attempt");
        Err(AppError::InvalidCredentials)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    async fn attempt(body: &str) -> Result<Json<MessageResponse>, AppError> {
        login(Bytes::from(body.to_string())).await
    }

    #[tokio::test]
    async fn test_login_with_demo_password() {
        let Json(body) = attempt(r#"{"username":"a","password":"password123"}"#)
            .await
            .unwrap();
        assert_eq!(body.message, "Welcome, a!");
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let result = attempt(r#"{"username":"a","password":"letmein"}"#).await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_missing_password() {
        let result = attempt(r#"{"username":"a"}"#).await;
        assert!(matches!(result, Err(AppError::MissingCredentials)));
    }

    #[tokio::test]
    async fn test_login_empty_username() {
        let result = attempt(r#"{"username":"","password":"password123"}"#).await;
        assert!(matches!(result, Err(AppError::MissingCredentials)));
    }

    #[tokio::test]
    async fn test_login_non_json_body() {
        assert!(matches!(
            attempt("username=a&password=password123").await,
            Err(AppError::MissingCredentials)
        ));
        assert!(matches!(attempt("").await, Err(AppError::MissingCredentials)));
        assert!(matches!(
            attempt("[1, 2, 3]").await,
            Err(AppError::MissingCredentials)
        ));
    }
}
