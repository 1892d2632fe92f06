pub mod adapters;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod scoring;

pub use adapters::{
    EspnClient, GameStatus, ScheduleSource, ScoreboardGame, SummaryClient, WinProbOutcome,
    WinProbSource,
};
pub use cache::{ScoreCache, ScoredGame};
pub use config::AppConfig;
pub use error::{PulseError, Result};
pub use scheduler::{decide, CheckDecision, GameMonitor, MonitorSnapshot, MonitorState};
pub use scoring::excitement_score;
