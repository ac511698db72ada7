//! # Workshop Test Utilities
//!
//! Shared test utilities for the workshop services.
//!
//! This crate provides:
//! - Server test harnesses (`TestWorkshopServer`, `TestWebhookServer`)
//! - Prometheus text format validation and sample lookup (`exposition`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use workshop_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestWorkshopServer::spawn().await?;
//!
//!     let response = reqwest::get(format!("{}/health", server.url())).await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod exposition;
pub mod server_harness;

// Re-export commonly used items
pub use exposition::*;
pub use server_harness::*;
