// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::dashboard_store::DashboardStore;
use crate::application::poller::Poller;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_source::HttpTelemetrySource;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create telemetry source (infrastructure layer)
    let source = Arc::new(HttpTelemetrySource::new(
        config.source.url.clone(),
        config.source.timeout(),
    )?);
    tracing::info!("Polling {} every {:?}", source.url(), config.poll.interval());

    // Create services (application layer)
    let store = DashboardStore::new();
    let dashboard_service = DashboardService::new(
        config.chart.style()?,
        config.chart.dimensions(),
        config.thresholds.thresholds(),
    );
    let poller = Arc::new(Poller::new(source, store.clone(), config.poll.interval()));
    let poller_handle = poller.clone().spawn();

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        store,
        poller,
        pages: config.pages.clone(),
        poll_interval: config.poll.interval(),
    });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config.server.addr.parse()?;
    tracing::info!("Starting water monitoring dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    poller_handle.shutdown().await;
    Ok(())
}
