//! Test server harness for E2E testing
//!
//! Provides `TestWorkshopServer` and `TestWebhookServer` for spawning real
//! server instances on random ports in tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use workshop_app::config::Config;
use workshop_app::observability::metrics::{RequestMetrics, RequestStats};
use workshop_app::routes::{self, AppState};

/// Variables applied before any per-test overrides.
///
/// File logging is off, delays are kept short and the fault RNG is seeded so
/// test runs are quick and repeatable.
const TEST_DEFAULT_VARS: [(&str, &str); 5] = [
    ("LOG_FILE", ""),
    ("MAY_FAIL_MIN_DELAY", "0"),
    ("MAY_FAIL_MAX_DELAY", "0.01"),
    ("SLOW_DELAY", "0.05"),
    ("FAULT_SEED", "20240501"),
];

async fn bind_random_port() -> Result<(tokio::net::TcpListener, SocketAddr), anyhow::Error> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

    let addr = listener
        .local_addr()
        .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

    Ok((listener, addr))
}

/// Test harness for spawning the workshop app in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health_flow_e2e() -> Result<()> {
///     let server = TestWorkshopServer::spawn().await?;
///     let client = reqwest::Client::new();
///
///     let response = client
///         .get(&format!("{}/health", server.url()))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestWorkshopServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    _handle: JoinHandle<()>,
}

impl TestWorkshopServer {
    /// Spawn a server with test defaults.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with(&[]).await
    }

    /// Spawn a server with test defaults plus `overrides`
    /// (e.g. `[("FAILURE_RATE", "1.0")]`).
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Own a fresh metrics registry, so counters start at zero
    /// - Start the HTTP server in the background
    pub async fn spawn_with(overrides: &[(&str, &str)]) -> Result<Self, anyhow::Error> {
        let mut vars: HashMap<String, String> = TEST_DEFAULT_VARS
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        for (key, value) in overrides {
            vars.insert((*key).to_string(), (*value).to_string());
        }

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let state = Arc::new(
            AppState::new(config)
                .map_err(|e| anyhow::anyhow!("Failed to create app state: {}", e))?,
        );

        // Build routes using workshop-app's real route builder
        let app = routes::build_routes(Arc::clone(&state));

        let (listener, addr) = bind_random_port().await?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the shared application state.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// Get reference to the server's metrics registry.
    pub fn metrics(&self) -> &RequestMetrics {
        &self.state.metrics
    }

    /// Current counter snapshot, read in-process.
    pub fn stats(&self) -> RequestStats {
        self.state.metrics.snapshot()
    }
}

impl Drop for TestWorkshopServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

/// Test harness for spawning the no-op webhook sink.
pub struct TestWebhookServer {
    addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl TestWebhookServer {
    /// Spawn the sink on a random local port.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let app = noop_webhook::routes::build_routes();

        let (listener, addr) = bind_random_port().await?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test webhook server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for TestWebhookServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
