// HTTP request handlers
use crate::application::chart_renderer::Dimensions;
use crate::application::dashboard_service::anomaly_list;
use crate::domain::telemetry::Channel;
use crate::infrastructure::chunked_json::stream_from_watch;
use crate::infrastructure::http_response::{
    accepts_brotli, body_response, json_response, SVG_CONTENT_TYPE,
};
use crate::infrastructure::svg::render_svg;
use crate::presentation::app_state::AppState;
use crate::presentation::page::{render_dashboard_page, render_embedded_page};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;

/// Largest canvas edge a client may request, in pixels.
const MAX_CANVAS_EDGE: f64 = 4096.0;

#[derive(Debug, Deserialize, Default)]
pub struct ChartQuery {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub channel: Option<Channel>,
}

impl ChartQuery {
    fn dimensions(&self, default: Dimensions) -> Dimensions {
        let edge = |requested: Option<f64>, fallback: f64| {
            requested
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(fallback)
                .min(MAX_CANVAS_EDGE)
        };
        Dimensions::new(
            edge(self.width, default.width),
            edge(self.height, default.height),
        )
    }
}

fn into_response(result: Result<Response, StatusCode>) -> Response {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full dashboard as JSON
pub async fn get_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let dashboard = state.dashboard_service.get_dashboard(&state.store.snapshot());
    into_response(json_response(&dashboard, accepts_brotli(&headers)).await)
}

/// Anomalous samples only
pub async fn list_anomalies(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let anomalies = anomaly_list(&state.store.snapshot().series);
    into_response(json_response(&anomalies, accepts_brotli(&headers)).await)
}

/// Chart as draw commands, for clients with their own drawing surface
pub async fn get_chart(
    Query(query): Query<ChartQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let service = &state.dashboard_service;
    let render = service.get_chart(
        &state.store.snapshot(),
        Some(query.dimensions(service.chart_dimensions())),
        query.channel,
    );
    into_response(json_response(&render, accepts_brotli(&headers)).await)
}

/// Chart rendered as SVG
pub async fn chart_svg(
    Query(query): Query<ChartQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let service = &state.dashboard_service;
    let render = service.get_chart(
        &state.store.snapshot(),
        Some(query.dimensions(service.chart_dimensions())),
        query.channel,
    );
    let svg = render_svg(&render.commands);
    into_response(body_response(svg.into_bytes(), SVG_CONTENT_TYPE, accepts_brotli(&headers)).await)
}

/// Manual refresh; skipped when a poll is already in flight
pub async fn refresh(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let outcome = state.poller.refresh().await;
    into_response(json_response(&outcome, accepts_brotli(&headers)).await)
}

/// Retry button on the HTML page
pub async fn refresh_page(State(state): State<Arc<AppState>>) -> Redirect {
    state.poller.refresh().await;
    Redirect::to("/")
}

/// Stream the dashboard as NDJSON, one line per store change
pub async fn stream_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let service = state.dashboard_service.clone();
    stream_from_watch(state.store.subscribe(), move |snapshot| {
        service.get_dashboard(snapshot)
    })
}

/// Server-rendered dashboard page
pub async fn dashboard_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let snapshot = state.store.snapshot();
    let service = &state.dashboard_service;
    let dashboard = service.get_dashboard(&snapshot);
    let chart = service.get_chart(&snapshot, None, None);

    Html(render_dashboard_page(
        &dashboard,
        &render_svg(&chart.commands),
        &state.pages,
        state.poll_interval.as_secs(),
    ))
}

/// External page embedded in the navigation shell
pub async fn embedded_page(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.pages.iter().find(|p| p.slug == slug) {
        Some(page) => Html(render_embedded_page(page, &state.pages)).into_response(),
        None => (StatusCode::NOT_FOUND, "page not found").into_response(),
    }
}
