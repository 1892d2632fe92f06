//! ESPN Game Summary Client
//!
//! Fetches the per-play win probability trajectory and final scores for a
//! single game from ESPN's summary endpoint. Recently finished games can lag
//! behind the scoreboard, so an empty trajectory is an explicit "no data yet"
//! outcome rather than an error.

use crate::config::SourceConfig;
use crate::error::Result;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

// ── Public types ────────────────────────────────────────────────

/// Win probability history and final result for one game
#[derive(Debug, Clone)]
pub struct GameData {
    pub game_id: String,
    /// Home team win probability per play, 0.0..=1.0
    pub wp_history: Vec<f64>,
    pub home_score: i32,
    pub away_score: i32,
    pub overtime: bool,
}

/// Outcome of a win probability fetch
#[derive(Debug, Clone)]
pub enum WinProbOutcome {
    Fetched(GameData),
    /// The source has no trajectory for this game yet; retry later
    NoDataYet,
}

/// Source of win probability trajectories for finished games
#[async_trait]
pub trait WinProbSource: Send + Sync {
    async fn fetch_game(&self, game_id: &str) -> Result<WinProbOutcome>;
}

// ── ESPN JSON deserialization structs ────────────────────────────

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    winprobability: Vec<WinProbEntry>,
    #[serde(default)]
    header: Option<SummaryHeader>,
}

#[derive(Debug, Deserialize)]
struct WinProbEntry {
    #[serde(rename = "homeWinPercentage", default = "default_wp")]
    home_win_percentage: f64,
}

fn default_wp() -> f64 {
    0.5
}

#[derive(Debug, Deserialize)]
struct SummaryHeader {
    #[serde(default)]
    competitions: Vec<SummaryCompetition>,
}

#[derive(Debug, Deserialize)]
struct SummaryCompetition {
    #[serde(default)]
    competitors: Vec<SummaryCompetitor>,
    #[serde(default)]
    status: Option<SummaryStatus>,
}

#[derive(Debug, Deserialize)]
struct SummaryCompetitor {
    #[serde(rename = "homeAway")]
    home_away: String,
    score: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryStatus {
    #[serde(rename = "type")]
    status_type: Option<SummaryStatusType>,
}

#[derive(Debug, Deserialize)]
struct SummaryStatusType {
    #[serde(rename = "shortDetail", default)]
    short_detail: String,
}

// ── Client ──────────────────────────────────────────────────────

/// ESPN summary endpoint client
pub struct SummaryClient {
    http: reqwest::Client,
    summary_url: String,
}

impl SummaryClient {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            summary_url: config.summary_url.clone(),
        })
    }

    fn parse_summary(game_id: &str, data: &SummaryResponse) -> WinProbOutcome {
        if data.winprobability.is_empty() {
            return WinProbOutcome::NoDataYet;
        }

        let wp_history: Vec<f64> = data
            .winprobability
            .iter()
            .map(|entry| entry.home_win_percentage)
            .collect();

        let competition = data
            .header
            .as_ref()
            .and_then(|h| h.competitions.first());

        let mut home_score = 0;
        let mut away_score = 0;
        if let Some(comp) = competition {
            for competitor in &comp.competitors {
                let score: i32 = competitor
                    .score
                    .as_deref()
                    .unwrap_or("0")
                    .parse()
                    .unwrap_or(0);
                if competitor.home_away == "home" {
                    home_score = score;
                } else {
                    away_score = score;
                }
            }
        }

        let short_detail = competition
            .and_then(|c| c.status.as_ref())
            .and_then(|s| s.status_type.as_ref())
            .map(|t| t.short_detail.as_str())
            .unwrap_or("");
        let overtime = short_detail.contains("OT") || short_detail.contains("Overtime");

        WinProbOutcome::Fetched(GameData {
            game_id: game_id.to_string(),
            wp_history,
            home_score,
            away_score,
            overtime,
        })
    }
}

#[async_trait]
impl WinProbSource for SummaryClient {
    async fn fetch_game(&self, game_id: &str) -> Result<WinProbOutcome> {
        let resp = self
            .http
            .get(&self.summary_url)
            .query(&[("event", game_id)])
            .send()
            .await
            .context("ESPN summary request failed")?;

        let data: SummaryResponse = resp
            .json()
            .await
            .context("ESPN summary JSON parse failed")?;

        let outcome = Self::parse_summary(game_id, &data);
        if matches!(outcome, WinProbOutcome::NoDataYet) {
            debug!(game_id, "no win probability data yet");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary_full() {
        let json = r#"{
            "winprobability": [
                {"homeWinPercentage": 0.55},
                {"homeWinPercentage": 0.62},
                {"homeWinPercentage": 0.94}
            ],
            "header": {
                "competitions": [{
                    "competitors": [
                        {"homeAway": "home", "score": "27"},
                        {"homeAway": "away", "score": "20"}
                    ],
                    "status": {"type": {"shortDetail": "Final"}}
                }]
            }
        }"#;

        let data: SummaryResponse = serde_json::from_str(json).unwrap();
        let outcome = SummaryClient::parse_summary("401772783", &data);

        match outcome {
            WinProbOutcome::Fetched(game) => {
                assert_eq!(game.game_id, "401772783");
                assert_eq!(game.wp_history, vec![0.55, 0.62, 0.94]);
                assert_eq!(game.home_score, 27);
                assert_eq!(game.away_score, 20);
                assert!(!game.overtime);
            }
            WinProbOutcome::NoDataYet => panic!("expected fetched data"),
        }
    }

    #[test]
    fn test_parse_summary_overtime_flag() {
        let json = r#"{
            "winprobability": [{"homeWinPercentage": 0.5}, {"homeWinPercentage": 0.7}],
            "header": {
                "competitions": [{
                    "competitors": [
                        {"homeAway": "home", "score": "30"},
                        {"homeAway": "away", "score": "24"}
                    ],
                    "status": {"type": {"shortDetail": "Final/OT"}}
                }]
            }
        }"#;

        let data: SummaryResponse = serde_json::from_str(json).unwrap();
        match SummaryClient::parse_summary("x", &data) {
            WinProbOutcome::Fetched(game) => assert!(game.overtime),
            WinProbOutcome::NoDataYet => panic!("expected fetched data"),
        }
    }

    #[test]
    fn test_empty_trajectory_is_no_data_yet() {
        let json = r#"{"winprobability": [], "header": {"competitions": []}}"#;
        let data: SummaryResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            SummaryClient::parse_summary("x", &data),
            WinProbOutcome::NoDataYet
        ));
    }
}
