//! No-op webhook sink
//!
//! Dummy Alertmanager receiver: logs every delivery and answers 200.

use common::logging::init_logging;
use common::shutdown::shutdown_signal;
use noop_webhook::config::{Config, DEFAULT_LOG_FILTER};
use noop_webhook::routes;
use std::net::SocketAddr;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    let logging = init_logging(DEFAULT_LOG_FILTER, config.log_file.as_deref())?;

    info!(
        bind_address = %config.bind_address,
        log_file = ?config.log_file,
        file_logging = logging.file_logging_enabled(),
        "Configuration loaded successfully"
    );

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("No-op webhook listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, routes::build_routes())
        .with_graceful_shutdown(shutdown_signal(config.drain_period))
        .await?;

    info!("No-op webhook shutdown complete");

    drop(logging);

    Ok(())
}
