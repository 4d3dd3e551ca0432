// Dashboard domain model
use super::telemetry::Channel;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_ANOMALIES_MESSAGE: &str = "No anomalies detected in the current data set.";
pub const NO_MAP_DATA_MESSAGE: &str = "No data available to display on map";

/// State of the upstream feed as last observed by the poller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FeedStatus {
    Loading,
    Ready,
    Error { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    Normal,
    Warning,
    Alert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub channel: Channel,
    pub title: String,
    pub value: String,
    pub change: String,
    pub trend: Option<Trend>,
    pub status: CardStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyEntry {
    pub timestamp: DateTime<Utc>,
    pub date: String,
    pub water_level: String,
    pub water_temperature: String,
    pub barometric_pressure: String,
    pub battery_voltage: String,
}

/// Illustrative monitoring location, positioned in percent of the map area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Station {
    pub label: &'static str,
    pub top_pct: f64,
    pub left_pct: f64,
}

pub const STATIONS: [Station; 4] = [
    Station { label: "Station A", top_pct: 30.0, left_pct: 50.0 },
    Station { label: "Station B", top_pct: 60.0, left_pct: 30.0 },
    Station { label: "Station C", top_pct: 40.0, left_pct: 70.0 },
    Station { label: "Station D", top_pct: 70.0, left_pct: 60.0 },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub station: Station,
    pub sample_index: usize,
    pub water_level: String,
    pub water_temperature: String,
    pub is_anomaly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub status: FeedStatus,
    pub last_updated: Option<DateTime<Utc>>,
    pub sample_count: usize,
    pub cards: Vec<MetricCard>,
    pub anomalies: Vec<AnomalyEntry>,
    pub anomaly_message: Option<String>,
    pub markers: Vec<MapMarker>,
    pub map_message: Option<String>,
}
