// Application layer - Use cases over the telemetry feed
pub mod chart_renderer;
pub mod dashboard_service;
pub mod dashboard_store;
pub mod poller;
pub mod telemetry_source;
