//! `POST /login` integration tests.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use anyhow::Result;
use serde_json::json;
use workshop_test_utils::TestWorkshopServer;

async fn post_login(server: &TestWorkshopServer, body: reqwest::Body) -> Result<reqwest::Response> {
    Ok(reqwest::Client::new()
        .post(format!("{}/login", server.url()))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await?)
}

#[tokio::test]
async fn test_login_success() -> Result<()> {
    let server = TestWorkshopServer::spawn().await?;

    let body = json!({"username": "a", "password": "password123"}).to_string();
    let response = post_login(&server, body.into()).await?;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"], "Welcome, a!");

    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password() -> Result<()> {
    let server = TestWorkshopServer::spawn().await?;

    let body = json!({"username": "a", "password": "hunter2"}).to_string();
    let response = post_login(&server, body.into()).await?;
    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "Invalid credentials");

    Ok(())
}

#[tokio::test]
async fn test_login_missing_fields() -> Result<()> {
    let server = TestWorkshopServer::spawn().await?;

    for body in [
        json!({"username": "a"}).to_string(),
        json!({"password": "password123"}).to_string(),
        json!({"username": "", "password": "password123"}).to_string(),
        "{}".to_string(),
        "not json".to_string(),
    ] {
        let response = post_login(&server, body.clone().into()).await?;
        assert_eq!(response.status(), 400, "body {body}");

        let json: serde_json::Value = response.json().await?;
        assert_eq!(json["error"], "Username and password required");
    }

    // Rejected logins still count as completed, failed requests.
    let stats = server.stats();
    assert_eq!(stats.total_requests, 5);
    assert_eq!(stats.failed_requests, 5);

    Ok(())
}
