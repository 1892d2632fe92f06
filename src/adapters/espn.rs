//! ESPN Scoreboard Client
//!
//! Fetches the NFL schedule and live game status from ESPN's public
//! scoreboard API. No API key required. The same endpoint serves both the
//! weekly schedule fetch and the in-window live status polls; ESPN has no
//! id-scoped query, so callers filter the returned events themselves.

use crate::config::SourceConfig;
use crate::error::Result;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

// ── Public types ────────────────────────────────────────────────

/// Coarse game status as reported by the scoreboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Final,
    Unknown,
}

impl GameStatus {
    /// Finished games are dropped from future monitoring
    pub fn is_relevant(&self) -> bool {
        matches!(self, GameStatus::Scheduled | GameStatus::InProgress)
    }

    pub fn is_final(&self) -> bool {
        matches!(self, GameStatus::Final)
    }
}

/// A game parsed from the ESPN scoreboard
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScoreboardGame {
    pub id: String,
    pub kickoff: DateTime<Utc>,
    pub status: GameStatus,
}

/// Source of the game schedule and live statuses
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn list_games(&self) -> Result<Vec<ScoreboardGame>>;
}

// ── ESPN JSON deserialization structs ────────────────────────────

#[derive(Debug, Deserialize)]
struct EspnResponse {
    #[serde(default)]
    events: Vec<EspnEvent>,
}

#[derive(Debug, Deserialize)]
struct EspnEvent {
    id: String,
    date: String,
    status: EspnEventStatus,
}

#[derive(Debug, Deserialize)]
struct EspnEventStatus {
    #[serde(rename = "type")]
    status_type: EspnStatusType,
}

#[derive(Debug, Deserialize)]
struct EspnStatusType {
    state: String,
    #[serde(rename = "shortDetail", default)]
    short_detail: String,
}

// ── Client ──────────────────────────────────────────────────────

/// ESPN scoreboard client
pub struct EspnClient {
    http: reqwest::Client,
    scoreboard_url: String,
}

impl EspnClient {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            scoreboard_url: config.scoreboard_url.clone(),
        })
    }

    fn parse_event(event: &EspnEvent) -> Option<ScoreboardGame> {
        let kickoff = match Self::parse_kickoff(&event.date) {
            Some(k) => k,
            None => {
                warn!(
                    game_id = %event.id,
                    date = %event.date,
                    "skipping event with unparseable kickoff"
                );
                return None;
            }
        };

        let status = match event.status.status_type.state.as_str() {
            "pre" => GameStatus::Scheduled,
            "in" => GameStatus::InProgress,
            "post" => GameStatus::Final,
            // Scoreboard sometimes reports odd states after the fact
            _ if event.status.status_type.short_detail.contains("Final") => GameStatus::Final,
            _ => GameStatus::Unknown,
        };

        Some(ScoreboardGame {
            id: event.id.clone(),
            kickoff,
            status,
        })
    }

    /// ESPN dates come as RFC 3339 or the truncated "2025-09-05T00:20Z" form
    fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[async_trait]
impl ScheduleSource for EspnClient {
    async fn list_games(&self) -> Result<Vec<ScoreboardGame>> {
        let resp = self
            .http
            .get(&self.scoreboard_url)
            .send()
            .await
            .context("ESPN scoreboard request failed")?;

        let data: EspnResponse = resp
            .json()
            .await
            .context("ESPN scoreboard JSON parse failed")?;

        let games: Vec<ScoreboardGame> =
            data.events.iter().filter_map(EspnClient::parse_event).collect();

        debug!("ESPN: fetched {} games", games.len());
        Ok(games)
    }
}
