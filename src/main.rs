// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Drivvo-Tracker API Server
//!
//! Polls the Drivvo service for each configured vehicle and serves the
//! derived fuel-economy sensors as JSON.

use drivvo_tracker::{
    config::Config,
    services::{DrivvoClient, IntegrationRegistry},
    AppState, DEFAULT_ENTRY_ID,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        vehicles = config.entry.vehicles.len(),
        interval_secs = config.scan_interval.as_secs(),
        "Starting Drivvo-Tracker"
    );

    let client = DrivvoClient::new(config.login_url.clone(), config.api_url.clone())?;
    let registry = IntegrationRegistry::new(client, config.scan_interval);

    // Refuse to start on bad credentials; per-vehicle problems only raise issues
    let report = match registry.setup(DEFAULT_ENTRY_ID, config.entry.clone()).await {
        Ok(report) => report,
        Err(e) if e.is_fatal_at_setup() => {
            tracing::error!(error = %e, "Integration setup failed");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(
        active = ?report.active,
        missing = ?report.missing,
        "Integration set up"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        registry,
    });

    // Build router
    let app = drivvo_tracker::routes::create_router(state.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.registry.unload_all().await;
    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("drivvo_tracker=debug,info")
            }),
        )
        .with(format)
        .init();
}
