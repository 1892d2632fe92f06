use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub cached_games: usize,
    pub uptime_secs: i64,
}

#[derive(Debug, Serialize)]
pub struct ExcitementResponse {
    pub game_id: String,
    pub excitement_score: f64,
    pub home_score: i32,
    pub away_score: i32,
    pub overtime: bool,
    pub cached: bool,
}

/// Per-game monitoring status for the operator endpoint
#[derive(Debug, Serialize)]
pub struct GameMonitorStatus {
    pub game_id: String,
    /// Still being watched by the monitor
    pub tracked: bool,
    /// Scored and cached; a repeated Final observation will not reprocess it
    pub processed: bool,
}

#[derive(Debug, Serialize)]
pub struct MonitorStatusResponse {
    pub last_refresh: Option<DateTime<Utc>>,
    pub next_check: Option<DateTime<Utc>>,
    pub slot_count: usize,
    pub games: Vec<GameMonitorStatus>,
}
