// Poller - Single-flight refresh of the dashboard store from the telemetry source
use crate::application::dashboard_store::DashboardStore;
use crate::application::telemetry_source::TelemetrySource;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    Updated { samples: usize },
    Failed { message: String },
    /// Another fetch was already in flight; nothing was started.
    Skipped,
}

pub struct Poller {
    source: Arc<dyn TelemetrySource>,
    store: DashboardStore,
    interval: Duration,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the fetch finishes or is cancelled.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Poller {
    pub fn new(source: Arc<dyn TelemetrySource>, store: DashboardStore, interval: Duration) -> Self {
        Self {
            source,
            store,
            interval,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Fetch once and publish the result, unless a fetch is already running.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Refresh requested while a fetch is in flight, skipping");
            return RefreshOutcome::Skipped;
        }
        let _guard = FlightGuard(&self.in_flight);

        match self.source.fetch_series().await {
            Ok(series) => {
                let samples = series.len();
                self.store.replace_series(series, chrono::Utc::now());
                tracing::info!("Dashboard refreshed with {} samples", samples);
                RefreshOutcome::Updated { samples }
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!("Error fetching water data: {}", message);
                self.store.record_error(message.clone());
                RefreshOutcome::Failed { message }
            }
        }
    }

    /// Refresh immediately, then once per interval, until the handle is shut
    /// down or dropped. Ticks missed while a fetch runs are skipped.
    pub fn spawn(self: Arc<Self>) -> PollerHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Poller shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.refresh().await;
                    }
                }
            }
        });

        PollerHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

pub struct PollerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop the timer and wait for the loop to exit. A fetch in progress is
    /// allowed to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::warn!("Poller task ended abnormally: {}", e);
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if self.shutdown.is_some() {
            self.task.abort();
        }
    }
}
