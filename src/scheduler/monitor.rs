//! Background game monitor
//!
//! The long-running task that owns the monitoring state. Each iteration
//! asks the decision engine what to do, then either sleeps until the next
//! check window or polls the scoreboard for finished games. Newly finished
//! games are scored and cached exactly once, then retired from monitoring.
//! No failure inside an iteration stops the loop.

use crate::adapters::{ScheduleSource, ScoreboardGame, WinProbOutcome, WinProbSource};
use crate::cache::{ScoreCache, ScoredGame};
use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::scheduler::decision::decide;
use crate::scheduler::state::MonitorState;
use crate::scoring::excitement_score;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Read-only view of the monitor for the API, published after every
/// decision so handlers never touch the monitoring state itself
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonitorSnapshot {
    pub last_refresh: Option<DateTime<Utc>>,
    pub next_check: Option<DateTime<Utc>>,
    pub tracked_games: Vec<String>,
    pub slot_count: usize,
}

pub struct GameMonitor {
    schedule: Arc<dyn ScheduleSource>,
    winprob: Arc<dyn WinProbSource>,
    cache: ScoreCache,
    config: SchedulerConfig,
    state: MonitorState,
    snapshot_tx: watch::Sender<MonitorSnapshot>,
}

impl GameMonitor {
    pub fn new(
        schedule: Arc<dyn ScheduleSource>,
        winprob: Arc<dyn WinProbSource>,
        cache: ScoreCache,
        config: SchedulerConfig,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(MonitorSnapshot::default());
        Self {
            schedule,
            winprob,
            cache,
            config,
            state: MonitorState::new(),
            snapshot_tx,
        }
    }

    /// Subscribe to monitor snapshots for the status endpoint
    pub fn subscribe(&self) -> watch::Receiver<MonitorSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Run until the stop signal flips. The signal is checked at every
    /// suspension point, so shutdown never waits out a long sleep.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("game monitor started");
        loop {
            let now = Utc::now();
            let decision =
                decide(now, &mut self.state, self.schedule.as_ref(), &self.config).await;

            let sleep_secs = if decision.should_poll {
                let ids = decision.game_ids.unwrap_or_default();
                match self.poll_scoreboard(&ids).await {
                    Ok(false) => decision.sleep_secs,
                    Ok(true) => self.config.recovery_interval_secs,
                    Err(e) => {
                        error!("scoreboard poll failed: {e}");
                        self.config.recovery_interval_secs
                    }
                }
            } else {
                decision.sleep_secs
            };

            self.publish_snapshot(Utc::now());

            debug!(sleep_secs, "monitor sleeping");
            if wait_or_shutdown(&mut shutdown, Duration::from_secs(sleep_secs)).await {
                break;
            }
        }
        info!("game monitor stopped");
    }

    /// Poll live statuses and handle every newly finished game.
    ///
    /// Returns whether any per-game processing failed; the caller then
    /// sleeps the fixed recovery interval instead of the decided one.
    async fn poll_scoreboard(&mut self, game_ids: &[String]) -> Result<bool> {
        let games = self.schedule.list_games().await?;

        let mut targets: Vec<&ScoreboardGame> = games
            .iter()
            .filter(|g| game_ids.contains(&g.id))
            .collect();
        if targets.is_empty() {
            warn!("monitored ids missing from scoreboard, checking all events");
            targets = games.iter().collect();
        }

        let mut had_errors = false;
        for game in targets {
            if !game.status.is_final() {
                continue;
            }

            if self.cache.contains(&game.id).await {
                // Already scored on a previous cycle; just stop polling it
                self.state.retire(&game.id);
                continue;
            }

            match self.process_finished(&game.id).await {
                Ok(true) => {
                    self.state.retire(&game.id);
                }
                Ok(false) => {
                    debug!(game_id = %game.id, "no score data yet, keeping game tracked");
                }
                Err(e) => {
                    error!(game_id = %game.id, "failed to process finished game: {e}");
                    had_errors = true;
                }
            }
        }

        Ok(had_errors)
    }

    /// Score and cache one finished game. Returns false when the source
    /// has no data yet, leaving the game tracked for the next cycle.
    async fn process_finished(&self, game_id: &str) -> Result<bool> {
        match self.winprob.fetch_game(game_id).await? {
            WinProbOutcome::NoDataYet => Ok(false),
            WinProbOutcome::Fetched(data) => {
                let score =
                    excitement_score(&data.wp_history, data.home_score, data.away_score);
                let rounded = (score * 10.0).round() / 10.0;
                info!(game_id, score = rounded, "game finished, excitement scored");

                self.cache
                    .insert(
                        game_id,
                        ScoredGame {
                            excitement_score: rounded,
                            home_score: data.home_score,
                            away_score: data.away_score,
                            overtime: data.overtime,
                            processed_at: Utc::now(),
                        },
                    )
                    .await?;
                Ok(true)
            }
        }
    }

    fn publish_snapshot(&self, now: DateTime<Utc>) {
        let snapshot = MonitorSnapshot {
            last_refresh: self.state.last_refresh(),
            next_check: self.state.next_check_time(now, &self.config),
            tracked_games: self.state.tracked_ids(),
            slot_count: self.state.slots().len(),
        };
        // Receivers may all be gone; the monitor does not care
        let _ = self.snapshot_tx.send(snapshot);
    }
}

/// Sleep for `duration`, returning true early if the stop signal flips
async fn wait_or_shutdown(shutdown: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    let sleep = tokio::time::sleep(duration);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            changed = shutdown.changed() => match changed {
                Ok(()) if *shutdown.borrow() => return true,
                Ok(()) => continue,
                // Sender dropped: the process is going away
                Err(_) => return true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{GameData, GameStatus};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeSchedule {
        games: Mutex<Vec<ScoreboardGame>>,
    }

    #[async_trait]
    impl ScheduleSource for FakeSchedule {
        async fn list_games(&self) -> Result<Vec<ScoreboardGame>> {
            Ok(self.games.lock().unwrap().clone())
        }
    }

    struct FakeWinProb {
        outcome: WinProbOutcome,
        calls: AtomicUsize,
    }

    impl FakeWinProb {
        fn fetched() -> Self {
            Self {
                outcome: WinProbOutcome::Fetched(GameData {
                    game_id: "g1".to_string(),
                    wp_history: vec![0.5, 0.2, 0.65, 0.95],
                    home_score: 27,
                    away_score: 24,
                    overtime: false,
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn no_data() -> Self {
            Self {
                outcome: WinProbOutcome::NoDataYet,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WinProbSource for FakeWinProb {
        async fn fetch_game(&self, _game_id: &str) -> Result<WinProbOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.outcome.clone())
        }
    }

    fn kickoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 7, 13, 0, 0).unwrap()
    }

    fn final_game(id: &str) -> ScoreboardGame {
        ScoreboardGame {
            id: id.to_string(),
            kickoff: kickoff(),
            status: GameStatus::Final,
        }
    }

    fn temp_cache(name: &str) -> (ScoreCache, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "gamepulse_monitor_{name}_{}.json",
            std::process::id()
        ));
        std::fs::remove_file(&path).ok();
        (ScoreCache::load(&path), path)
    }

    fn monitor(
        schedule: Arc<FakeSchedule>,
        winprob: Arc<FakeWinProb>,
        cache: ScoreCache,
    ) -> GameMonitor {
        GameMonitor::new(schedule, winprob, cache, SchedulerConfig::default())
    }

    async fn track(monitor: &mut GameMonitor, ids: &[&str]) {
        // Prime the state straight into the check window
        let now = kickoff() + chrono::Duration::hours(3) + chrono::Duration::minutes(30);
        let decision = decide(
            now,
            &mut monitor.state,
            monitor.schedule.as_ref(),
            &monitor.config,
        )
        .await;
        assert!(decision.should_poll);
        let decided = decision.game_ids.unwrap();
        for id in ids {
            assert!(decided.contains(&id.to_string()));
        }
    }

    #[tokio::test]
    async fn test_finished_game_scored_once_then_retired() {
        let schedule = Arc::new(FakeSchedule {
            games: Mutex::new(vec![ScoreboardGame {
                id: "g1".to_string(),
                kickoff: kickoff(),
                status: GameStatus::InProgress,
            }]),
        });
        let winprob = Arc::new(FakeWinProb::fetched());
        let (cache, path) = temp_cache("once");
        let mut mon = monitor(schedule.clone(), winprob.clone(), cache.clone());
        track(&mut mon, &["g1"]).await;

        // First observation of Final: processed and retired
        *schedule.games.lock().unwrap() = vec![final_game("g1")];
        let had_errors = mon.poll_scoreboard(&["g1".to_string()]).await.unwrap();
        assert!(!had_errors);
        assert!(cache.contains("g1").await);
        assert!(mon.state.tracked_ids().is_empty());

        // Re-track the same game as a stale schedule refresh would
        mon.state.replace_slots(
            vec![crate::scheduler::slots::Slot {
                anchor: kickoff(),
                game_ids: vec!["g1".to_string()],
            }],
            kickoff(),
        );

        // Second observation: retirement only, no reprocessing
        mon.poll_scoreboard(&["g1".to_string()]).await.unwrap();
        assert!(mon.state.tracked_ids().is_empty());
        assert_eq!(
            winprob.calls.load(Ordering::SeqCst),
            1,
            "downstream scoring must run exactly once"
        );

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_no_data_yet_keeps_game_tracked() {
        let schedule = Arc::new(FakeSchedule {
            games: Mutex::new(vec![ScoreboardGame {
                id: "g1".to_string(),
                kickoff: kickoff(),
                status: GameStatus::Scheduled,
            }]),
        });
        let (cache, path) = temp_cache("nodata");
        let mut mon = monitor(schedule.clone(), Arc::new(FakeWinProb::no_data()), cache.clone());
        track(&mut mon, &["g1"]).await;

        *schedule.games.lock().unwrap() = vec![final_game("g1")];
        let had_errors = mon.poll_scoreboard(&["g1".to_string()]).await.unwrap();

        assert!(!had_errors);
        assert!(!cache.contains("g1").await);
        assert_eq!(mon.state.tracked_ids(), vec!["g1"]);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_unmatched_filter_falls_back_to_all_events() {
        let schedule = Arc::new(FakeSchedule {
            games: Mutex::new(vec![final_game("other")]),
        });
        let (cache, path) = temp_cache("fallback");
        let mut mon = monitor(schedule, Arc::new(FakeWinProb::fetched()), cache.clone());

        // Filtered set matches nothing on the scoreboard
        mon.poll_scoreboard(&["g1".to_string()]).await.unwrap();

        // The fallback still processed the finished game it did find
        assert!(cache.contains("other").await);

        std::fs::remove_file(&path).ok();
    }
}
