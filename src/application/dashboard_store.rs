// Dashboard store - Latest series and feed status, shared through a watch channel
use crate::domain::dashboard::FeedStatus;
use crate::domain::telemetry::Series;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub status: FeedStatus,
    pub series: Arc<Series>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    pub fn loading() -> Self {
        Self {
            status: FeedStatus::Loading,
            series: Arc::new(Series::empty()),
            last_updated: None,
        }
    }
}

#[derive(Clone)]
pub struct DashboardStore {
    tx: Arc<watch::Sender<DashboardSnapshot>>,
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DashboardSnapshot::loading());
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.tx.subscribe()
    }

    /// Replace the series wholesale and clear any previous error.
    pub fn replace_series(&self, series: Series, at: DateTime<Utc>) {
        self.tx.send_replace(DashboardSnapshot {
            status: FeedStatus::Ready,
            series: Arc::new(series),
            last_updated: Some(at),
        });
    }

    /// Record a failed poll. The last good series stays on display.
    pub fn record_error(&self, message: String) {
        self.tx.send_modify(|snapshot| {
            snapshot.status = FeedStatus::Error { message };
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::tests::{day, level_sample};

    #[test]
    fn test_starts_loading() {
        let store = DashboardStore::new();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.status, FeedStatus::Loading);
        assert!(snapshot.series.is_empty());
        assert!(snapshot.last_updated.is_none());
    }

    #[test]
    fn test_error_keeps_series_until_next_success() {
        let store = DashboardStore::new();
        store.replace_series(Series::from_unordered(vec![level_sample(1, 1.0, false)]), day(1));

        store.record_error("upstream down".to_string());
        let failed = store.snapshot();
        assert_eq!(
            failed.status,
            FeedStatus::Error {
                message: "upstream down".to_string()
            }
        );
        assert_eq!(failed.series.len(), 1);
        assert_eq!(failed.last_updated, Some(day(1)));

        store.replace_series(Series::empty(), day(2));
        let recovered = store.snapshot();
        assert_eq!(recovered.status, FeedStatus::Ready);
        assert!(recovered.series.is_empty());
        assert_eq!(recovered.last_updated, Some(day(2)));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = DashboardStore::new();
        let mut rx = store.subscribe();

        store.replace_series(Series::empty(), day(3));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().last_updated, Some(day(3)));
    }
}
