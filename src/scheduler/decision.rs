//! Check decision engine
//!
//! Decides, for a given instant, whether the monitor should poll the
//! scoreboard now, which games to ask about, and how long to sleep
//! otherwise. Priority order: refresh-needed, then in-window, then
//! next-window, then the refresh-cadence fallback.

use crate::adapters::ScheduleSource;
use crate::config::SchedulerConfig;
use crate::scheduler::slots::group_into_slots;
use crate::scheduler::state::MonitorState;
use crate::scheduler::window::{check_window, CheckWindow};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// What the monitor loop should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDecision {
    pub should_poll: bool,
    /// Games to ask about when polling
    pub game_ids: Option<Vec<String>>,
    pub sleep_secs: u64,
}

impl CheckDecision {
    fn poll(game_ids: Vec<String>, sleep_secs: u64) -> Self {
        Self {
            should_poll: true,
            game_ids: Some(game_ids),
            sleep_secs,
        }
    }

    fn sleep(sleep_secs: u64) -> Self {
        Self {
            should_poll: false,
            game_ids: None,
            sleep_secs,
        }
    }
}

/// Decide what to do at `now`.
///
/// Refreshes the schedule first when the cadence has elapsed; a failed
/// fetch degrades to an empty slot set so monitoring falls back to the
/// refresh cadence instead of erroring.
pub async fn decide(
    now: DateTime<Utc>,
    state: &mut MonitorState,
    source: &dyn ScheduleSource,
    config: &SchedulerConfig,
) -> CheckDecision {
    if state.needs_refresh(now, config) {
        info!("refreshing game schedule");
        let games = match source.list_games().await {
            Ok(games) => games,
            Err(e) => {
                warn!("schedule fetch failed, degrading to refresh cadence: {e}");
                Vec::new()
            }
        };

        let slots = group_into_slots(&games, config.slot_proximity());
        info!(slots = slots.len(), "schedule rebuilt");
        state.replace_slots(slots, now);

        if state.slots().is_empty() {
            return CheckDecision::sleep(config.refresh_interval_secs);
        }
    }

    let windows: Vec<CheckWindow> = state
        .slots()
        .iter()
        .map(|slot| check_window(slot, config))
        .collect();

    if windows.is_empty() {
        return CheckDecision::sleep(config.refresh_interval_secs);
    }

    // Union of every window open right now, so back-to-back slots with
    // overlapping windows are all polled rather than just the first match
    let open_ids: Vec<String> = windows
        .iter()
        .filter(|w| w.contains(now))
        .flat_map(|w| w.game_ids.iter().cloned())
        .collect();

    if !open_ids.is_empty() {
        debug!(games = open_ids.len(), "inside a check window");
        return CheckDecision::poll(open_ids, config.poll_interval_secs);
    }

    // Slots are kickoff-ordered, so the first future window is the earliest
    if let Some(next) = windows.iter().find(|w| now < w.opens) {
        let sleep_secs = (next.opens - now).num_seconds().max(0) as u64;
        debug!(
            opens = %next.opens,
            games = next.game_ids.len(),
            "sleeping until next check window"
        );
        return CheckDecision::sleep(sleep_secs);
    }

    // Every window for the current schedule has elapsed
    debug!("all check windows elapsed, waiting for next refresh");
    CheckDecision::sleep(config.refresh_interval_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{GameStatus, ScoreboardGame};
    use crate::error::{PulseError, Result};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    /// Scripted schedule source; each refresh pops the next response
    struct FakeSource {
        responses: Mutex<Vec<Result<Vec<ScoreboardGame>>>>,
    }

    impl FakeSource {
        fn with_games(games: Vec<ScoreboardGame>) -> Self {
            Self {
                responses: Mutex::new(vec![Ok(games)]),
            }
        }

        fn failing() -> Self {
            Self {
                responses: Mutex::new(vec![Err(PulseError::Internal("down".to_string()))]),
            }
        }
    }

    #[async_trait]
    impl ScheduleSource for FakeSource {
        async fn list_games(&self) -> Result<Vec<ScoreboardGame>> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                panic!("unexpected extra schedule fetch");
            }
            responses.remove(0)
        }
    }

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 7, hour, min, 0).unwrap()
    }

    fn scheduled(id: &str, kickoff: DateTime<Utc>) -> ScoreboardGame {
        ScoreboardGame {
            id: id.to_string(),
            kickoff,
            status: GameStatus::Scheduled,
        }
    }

    #[tokio::test]
    async fn test_first_use_refreshes_then_evaluates() {
        let config = SchedulerConfig::default();
        let mut state = MonitorState::new();
        let source = FakeSource::with_games(vec![scheduled("a", at(13, 0))]);

        // now = kickoff + 3h30m, inside the freshly fetched window
        let decision = decide(at(16, 30), &mut state, &source, &config).await;

        assert!(decision.should_poll);
        assert_eq!(decision.game_ids, Some(vec!["a".to_string()]));
        assert_eq!(decision.sleep_secs, 300);
        assert_eq!(state.last_refresh(), Some(at(16, 30)));
    }

    #[tokio::test]
    async fn test_empty_schedule_sleeps_full_cadence() {
        let config = SchedulerConfig::default();
        let mut state = MonitorState::new();
        let source = FakeSource::with_games(vec![]);

        let decision = decide(at(12, 0), &mut state, &source, &config).await;

        assert!(!decision.should_poll);
        assert_eq!(decision.game_ids, None);
        assert_eq!(decision.sleep_secs, 21600);
    }

    #[tokio::test]
    async fn test_failed_fetch_degrades_to_cadence() {
        let config = SchedulerConfig::default();
        let mut state = MonitorState::new();
        let source = FakeSource::failing();

        let decision = decide(at(12, 0), &mut state, &source, &config).await;

        assert!(!decision.should_poll);
        assert_eq!(decision.sleep_secs, 21600);
        // The failed refresh still counts as a refresh
        assert_eq!(state.last_refresh(), Some(at(12, 0)));
    }

    #[tokio::test]
    async fn test_before_window_sleeps_exactly_until_open() {
        let config = SchedulerConfig::default();
        let mut state = MonitorState::new();
        let source = FakeSource::with_games(vec![scheduled("a", at(13, 0))]);

        // now = kickoff + 1h; window opens at kickoff + 3h
        let decision = decide(at(14, 0), &mut state, &source, &config).await;

        assert!(!decision.should_poll);
        assert_eq!(decision.sleep_secs, 2 * 3600);
    }

    #[tokio::test]
    async fn test_all_windows_elapsed_waits_for_refresh() {
        let config = SchedulerConfig::default();
        let mut state = MonitorState::new();
        let source = FakeSource::with_games(vec![scheduled("a", at(13, 0))]);

        // Prime the state at 12:00, then ask again after the window closed
        decide(at(12, 0), &mut state, &source, &config).await;
        let decision = decide(at(17, 30), &mut state, &source, &config).await;

        assert!(!decision.should_poll);
        assert_eq!(decision.sleep_secs, 21600);
    }

    #[tokio::test]
    async fn test_overlapping_windows_return_union() {
        let config = SchedulerConfig::default();
        let mut state = MonitorState::new();
        // Anchors 40 minutes apart: two slots, windows [16:00,17:00) and
        // [16:40,17:40) both open at 16:45
        let source = FakeSource::with_games(vec![
            scheduled("a", at(13, 0)),
            scheduled("b", at(13, 40)),
        ]);

        let decision = decide(at(16, 45), &mut state, &source, &config).await;

        assert!(decision.should_poll);
        assert_eq!(
            decision.game_ids,
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[tokio::test]
    async fn test_window_coverage_is_monotonic() {
        let config = SchedulerConfig::default();
        let mut state = MonitorState::new();
        let source = FakeSource::with_games(vec![scheduled("a", at(13, 0))]);

        decide(at(12, 0), &mut state, &source, &config).await;

        // Walk strictly increasing times; once the window has fully elapsed
        // it must never come back without a refresh
        let mut seen_elapsed = false;
        let mut t = at(12, 30);
        while t < at(17, 45) {
            let decision = decide(t, &mut state, &source, &config).await;
            if seen_elapsed {
                assert!(
                    !decision.should_poll,
                    "window reopened at {t} after elapsing"
                );
            }
            if !decision.should_poll && t >= at(17, 0) {
                seen_elapsed = true;
            }
            t += Duration::minutes(15);
        }
        assert!(seen_elapsed);
    }
}
