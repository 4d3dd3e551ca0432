// Domain layer - Telemetry, chart and dashboard models
pub mod chart;
pub mod dashboard;
pub mod telemetry;
