// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::dashboard_store::DashboardStore;
use crate::application::poller::Poller;
use crate::infrastructure::config::PageConfig;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub store: DashboardStore,
    pub poller: Arc<Poller>,
    pub pages: Vec<PageConfig>,
    pub poll_interval: Duration,
}
