//! No-op webhook sink for Alertmanager.
//!
//! Accepts `POST /noop-webhook`, logs the headers and raw body, and answers
//! 200 with an empty body. Nothing is parsed, validated or retried; it exists
//! so an alert route has somewhere harmless to deliver to.

pub mod config;
pub mod handlers;
pub mod routes;
