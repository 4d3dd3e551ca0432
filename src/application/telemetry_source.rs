// Source trait for telemetry data access
use crate::domain::telemetry::Series;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed telemetry payload: {0}")]
    Payload(String),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetch the current series, ordered oldest first.
    async fn fetch_series(&self) -> Result<Series, SourceError>;
}
