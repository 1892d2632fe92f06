use crate::adapters::WinProbSource;
use crate::cache::ScoreCache;
use crate::scheduler::MonitorSnapshot;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

/// Shared state for API handlers.
///
/// Handlers read the score cache and the monitor's published snapshot;
/// they never touch the monitoring state, which stays owned by the
/// monitor task.
#[derive(Clone)]
pub struct AppState {
    pub cache: ScoreCache,
    pub winprob: Arc<dyn WinProbSource>,
    pub monitor: watch::Receiver<MonitorSnapshot>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        cache: ScoreCache,
        winprob: Arc<dyn WinProbSource>,
        monitor: watch::Receiver<MonitorSnapshot>,
    ) -> Self {
        Self {
            cache,
            winprob,
            monitor,
            started_at: Utc::now(),
        }
    }
}
