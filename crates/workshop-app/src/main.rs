//! Monitoring Workshop App
//!
//! Entry point for the instrumented workshop service.

use common::logging::init_logging;
use common::shutdown::shutdown_signal;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use workshop_app::config::Config;
use workshop_app::observability::metrics::{spawn_upkeep, UPKEEP_INTERVAL};
use workshop_app::routes::{self, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration comes first: DEBUG and LOG_FILE shape the logging setup.
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    let logging = init_logging(config.log_filter(), config.log_file.as_deref())?;

    info!(
        bind_address = %config.bind_address,
        debug = config.debug,
        failure_rate = config.failure_rate,
        slow_delay_secs = config.slow_delay.as_secs_f64(),
        log_file = ?config.log_file,
        file_logging = logging.file_logging_enabled(),
        "Configuration loaded successfully"
    );

    let bind_address = config.bind_address.clone();
    let drain_period = config.drain_period;

    // Create application state (owns the metrics registry)
    let state = Arc::new(AppState::new(config).map_err(|e| {
        error!("Failed to initialize metrics registry: {}", e);
        e
    })?);

    // The registry is not installed globally, so drain histograms ourselves
    let _upkeep = spawn_upkeep(Arc::clone(&state.metrics), UPKEEP_INTERVAL);

    // Build application routes
    let app = routes::build_routes(state);

    // Parse bind address
    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Starting workshop app on {}", addr);

    // Start server with graceful shutdown support
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(drain_period))
    .await?;

    info!("Workshop app shutdown complete");

    drop(logging);

    Ok(())
}
