use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::adapters::WinProbOutcome;
use crate::api::{state::AppState, types::*};
use crate::cache::ScoredGame;
use crate::scoring::excitement_score;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "gamepulse",
        cached_games: state.cache.len().await,
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// GET /api/excitement/:game_id
///
/// Returns the cached score when the monitor has already processed the
/// game; otherwise fetches the trajectory on demand, scores it, and
/// caches the result.
pub async fn get_excitement(
    Path(game_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ExcitementResponse>, (StatusCode, String)> {
    if let Some(scored) = state.cache.get(&game_id).await {
        return Ok(Json(ExcitementResponse {
            game_id,
            excitement_score: scored.excitement_score,
            home_score: scored.home_score,
            away_score: scored.away_score,
            overtime: scored.overtime,
            cached: true,
        }));
    }

    let outcome = state
        .winprob
        .fetch_game(&game_id)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;

    let data = match outcome {
        WinProbOutcome::Fetched(data) => data,
        WinProbOutcome::NoDataYet => {
            return Err((
                StatusCode::NOT_FOUND,
                format!("Game {game_id} not found or no win probability data available"),
            ));
        }
    };

    let score = excitement_score(&data.wp_history, data.home_score, data.away_score);
    let rounded = (score * 10.0).round() / 10.0;
    info!(game_id = %game_id, score = rounded, "scored game on demand");

    let scored = ScoredGame {
        excitement_score: rounded,
        home_score: data.home_score,
        away_score: data.away_score,
        overtime: data.overtime,
        processed_at: Utc::now(),
    };
    // Serve the response even if persisting the cache fails
    if let Err(e) = state.cache.insert(&game_id, scored).await {
        warn!(game_id = %game_id, "failed to persist score cache: {e}");
    }

    Ok(Json(ExcitementResponse {
        game_id,
        excitement_score: rounded,
        home_score: data.home_score,
        away_score: data.away_score,
        overtime: data.overtime,
        cached: false,
    }))
}

/// GET /api/monitor/status
///
/// Operator view: which games are still tracked, which are processed,
/// and when the next check is due.
pub async fn monitor_status(
    State(state): State<AppState>,
) -> Json<MonitorStatusResponse> {
    let snapshot = state.monitor.borrow().clone();

    let mut games: Vec<GameMonitorStatus> = Vec::new();
    for game_id in &snapshot.tracked_games {
        games.push(GameMonitorStatus {
            game_id: game_id.clone(),
            tracked: true,
            processed: state.cache.contains(game_id).await,
        });
    }
    for game_id in state.cache.game_ids().await {
        if !snapshot.tracked_games.contains(&game_id) {
            games.push(GameMonitorStatus {
                game_id,
                tracked: false,
                processed: true,
            });
        }
    }

    Json(MonitorStatusResponse {
        last_refresh: snapshot.last_refresh,
        next_check: snapshot.next_check,
        slot_count: snapshot.slot_count,
        games,
    })
}
