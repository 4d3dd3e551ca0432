// HTTP telemetry source - Fetches the water monitoring feed as JSON
use crate::application::telemetry_source::{
    FetchError, ParseError, SourceError, TelemetrySource,
};
use crate::domain::telemetry::{Sample, Series};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Upstream sentinel marking an anomalous reading.
const ANOMALY_SENTINEL: &str = "Yes";

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

#[derive(Debug, Clone)]
pub struct HttpTelemetrySource {
    url: String,
    client: reqwest::Client,
}

/// One record of the upstream feed. Fields are kept loose so that a single
/// bad value does not reject the whole payload.
#[derive(Debug, Deserialize)]
struct FeedRecord {
    #[serde(rename = "Battery_V", default)]
    battery_v: Value,
    #[serde(rename = "Water_Temperature", default)]
    water_temperature: Value,
    #[serde(rename = "Water_Level", default)]
    water_level: Value,
    #[serde(rename = "Barometric_Pressure", default)]
    barometric_pressure: Value,
    #[serde(rename = "Date_Time", default)]
    date_time: Value,
    #[serde(rename = "Anomaly", default)]
    anomaly: Value,
}

impl HttpTelemetrySource {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TelemetrySource for HttpTelemetrySource {
    async fn fetch_series(&self) -> Result<Series, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: self.url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.bytes().await.map_err(|e| FetchError::Transport {
            url: self.url.clone(),
            message: e.to_string(),
        })?;

        let series = parse_feed(&body)?;
        tracing::debug!("Fetched {} samples from {}", series.len(), self.url);
        Ok(series)
    }
}

/// Parse a feed body into a series sorted by timestamp.
pub fn parse_feed(body: &[u8]) -> Result<Series, ParseError> {
    let records: Vec<FeedRecord> =
        serde_json::from_slice(body).map_err(|e| ParseError::Payload(e.to_string()))?;

    let total = records.len();
    let samples: Vec<Sample> = records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| {
            let sample = record.into_sample();
            if sample.is_none() {
                tracing::warn!("Dropping record {} with unparseable Date_Time", i);
            }
            sample
        })
        .collect();

    if samples.len() < total {
        tracing::warn!("Kept {} of {} feed records", samples.len(), total);
    }

    Ok(Series::from_unordered(samples))
}

impl FeedRecord {
    fn into_sample(self) -> Option<Sample> {
        let timestamp = self.date_time.as_str().and_then(parse_timestamp)?;
        Some(Sample::new(
            timestamp,
            lenient_number(&self.water_level),
            lenient_number(&self.water_temperature),
            lenient_number(&self.barometric_pressure),
            lenient_number(&self.battery_v),
            is_anomaly(&self.anomaly),
        ))
    }
}

/// Numbers and numeric strings are accepted; anything else becomes NaN and
/// is dropped from the chart later.
fn lenient_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn is_anomaly(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim() == ANOMALY_SENTINEL,
        Value::Bool(b) => *b,
        _ => false,
    }
}

/// Parse an upstream timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use chrono::TimeZone;

    const FEED: &str = r#"[
        {"Battery_V": 3.9, "Water_Temperature": 21.5, "Water_Level": 2.0, "Barometric_Pressure": 1012.4, "Date_Time": "2024-01-03", "Anomaly": "No"},
        {"Battery_V": 3.8, "Water_Temperature": 21.0, "Water_Level": 1.0, "Barometric_Pressure": 1013.0, "Date_Time": "2024-01-01", "Anomaly": "No"},
        {"Battery_V": 3.7, "Water_Temperature": 22.1, "Water_Level": 3.0, "Barometric_Pressure": 1011.9, "Date_Time": "2024-01-02", "Anomaly": "Yes"}
    ]"#;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/data", addr)
    }

    fn source(url: String) -> HttpTelemetrySource {
        HttpTelemetrySource::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_parse_feed_sorts_and_flags() {
        let series = parse_feed(FEED.as_bytes()).unwrap();
        let levels: Vec<f64> = series.samples().iter().map(|s| s.water_level).collect();
        assert_eq!(levels, vec![1.0, 3.0, 2.0]);

        let flags: Vec<bool> = series.samples().iter().map(|s| s.is_anomaly).collect();
        assert_eq!(flags, vec![false, true, false]);
        assert_eq!(
            series.samples()[0].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(series.samples()[1].battery_voltage, 3.7);
    }

    #[test]
    fn test_parse_feed_is_lenient_with_values() {
        let body = r#"[
            {"Water_Level": "1.5", "Date_Time": "2024-01-01 08:30:00", "Anomaly": " Yes "},
            {"Water_Level": null, "Date_Time": "2024-01-02T08:30:00Z", "Anomaly": null},
            {"Water_Level": "deep", "Date_Time": "1/3/2024 8:30", "Anomaly": true},
            {"Water_Level": 2.0, "Date_Time": "not a date", "Anomaly": "Yes"},
            {"Water_Level": 2.5, "Anomaly": "yes"}
        ]"#;
        let series = parse_feed(body.as_bytes()).unwrap();

        assert_eq!(series.len(), 3);
        let samples = series.samples();
        assert_eq!(samples[0].water_level, 1.5);
        assert!(samples[0].is_anomaly);
        assert!(samples[0].battery_voltage.is_nan());
        assert!(samples[1].water_level.is_nan());
        assert!(!samples[1].is_anomaly);
        assert!(samples[2].water_level.is_nan());
        assert!(samples[2].is_anomaly);
    }

    #[test]
    fn test_parse_feed_rejects_non_array() {
        assert!(matches!(
            parse_feed(br#"{"error": "nope"}"#),
            Err(ParseError::Payload(_))
        ));
        assert!(matches!(parse_feed(b"<html>"), Err(ParseError::Payload(_))));
        assert!(parse_feed(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-05T14:07:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T16:07:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05 14:07:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T14:07:00"), Some(expected));
        assert_eq!(parse_timestamp("3/5/2024 14:07"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-05"),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_parse_timestamp_fractional_seconds() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap()
            + chrono::Duration::milliseconds(250);
        assert_eq!(parse_timestamp("2024-01-01 08:30:00.250"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T08:30:00.250"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T08:30:00.250Z"), Some(expected));
    }

    #[tokio::test]
    async fn test_fetch_series_over_http() {
        let url = serve(Router::new().route("/data", get(|| async { FEED }))).await;
        let series = source(url).fetch_series().await.unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.anomalies().count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_series_status_error() {
        let url = serve(Router::new().route(
            "/data",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        ))
        .await;

        match source(url).fetch_series().await {
            Err(SourceError::Fetch(FetchError::Status { status, .. })) => assert_eq!(status, 503),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_series_parse_error() {
        let url = serve(Router::new().route("/data", get(|| async { "not json" }))).await;
        assert!(matches!(
            source(url).fetch_series().await,
            Err(SourceError::Parse(ParseError::Payload(_)))
        ));
    }

    #[tokio::test]
    async fn test_fetch_series_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = source(format!("http://{}/data", addr)).fetch_series().await;
        assert!(matches!(
            result,
            Err(SourceError::Fetch(FetchError::Transport { .. }))
        ));
    }
}
