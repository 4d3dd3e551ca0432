// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    chart_svg, dashboard_page, embedded_page, get_chart, get_dashboard, health_check,
    list_anomalies, refresh, refresh_page, stream_dashboard,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    // JSON and SVG bodies are compressed by their handlers, so only the HTML
    // pages go through CompressionLayer.
    let pages = Router::new()
        .route("/", get(dashboard_page))
        .route("/pages/:slug", get(embedded_page))
        .layer(CompressionLayer::new());

    Router::new()
        .route("/healthz", get(health_check))
        .route("/refresh", post(refresh_page))
        .route("/chart.svg", get(chart_svg))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/dashboard/stream", get(stream_dashboard))
        .route("/api/anomalies", get(list_anomalies))
        .route("/api/chart", get(get_chart))
        .route("/api/refresh", post(refresh))
        .merge(pages)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
