pub mod espn;
pub mod summary;

pub use espn::{EspnClient, GameStatus, ScheduleSource, ScoreboardGame};
pub use summary::{GameData, SummaryClient, WinProbOutcome, WinProbSource};
