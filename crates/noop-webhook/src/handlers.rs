//! Webhook handler.

use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
};
use std::collections::BTreeMap;
use tracing::info;

/// Render headers as `{name: value}` for a single log line. Non-UTF-8 values
/// are replaced lossily rather than dropped.
pub fn headers_for_log(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut rendered: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        rendered
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    rendered
}

/// Handler for `POST /noop-webhook`.
///
/// Logs headers and body, then always answers 200 with an empty body.
pub async fn noop_webhook(headers: HeaderMap, body: Bytes) -> StatusCode {
    info!("Headers: {:?}", headers_for_log(&headers));
    info!("Body: {}", String::from_utf8_lossy(&body));

    StatusCode::OK
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn test_noop_webhook_always_ok() {
        let body = Bytes::from_static(b"\xff\xfe not utf8");
        let status = noop_webhook(HeaderMap::new(), body).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn test_headers_for_log_joins_repeated_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.append("x-alert", HeaderValue::from_static("one"));
        headers.append("x-alert", HeaderValue::from_static("two"));

        let rendered = headers_for_log(&headers);

        assert_eq!(rendered.get("content-type").unwrap(), "application/json");
        assert_eq!(rendered.get("x-alert").unwrap(), "one, two");
    }
}
