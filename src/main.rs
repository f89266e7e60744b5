//! rental-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use rental_gateway::api;
use rental_gateway::app_state::AppState;
use rental_gateway::config::GatewayConfig;
use rental_gateway::persistence::{AppointmentStore, PostgresPersistence};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(addr = %config.listen_addr, "starting rental-gateway");

    // Build storage and services
    let app_state = if config.persistence_enabled {
        let persistence = Arc::new(
            PostgresPersistence::connect(&config)
                .await
                .context("failed to connect to PostgreSQL")?,
        );
        tracing::info!("using PostgreSQL storage");
        AppState::new(
            &config,
            Arc::clone(&persistence) as Arc<dyn AppointmentStore>,
            persistence,
        )
    } else {
        tracing::info!("using in-memory storage");
        AppState::in_memory(&config)
    };

    let app = api::build_app(app_state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
