//! Score cache
//!
//! JSON-file-backed map of game id to computed excitement result. This is
//! both the persisted store the API reads and the monitor's dedupe record:
//! a game present here has already been processed and must not be scored
//! again. Writes rewrite the whole file; the data set is a season of games
//! at most.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// Cached result for one processed game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredGame {
    pub excitement_score: f64,
    pub home_score: i32,
    pub away_score: i32,
    pub overtime: bool,
    pub processed_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ScoreCache {
    path: PathBuf,
    games: Arc<RwLock<HashMap<String, ScoredGame>>>,
}

impl ScoreCache {
    /// Load the cache file, starting empty when it is missing or corrupt
    pub fn load<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let games = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(games) => games,
                Err(e) => {
                    warn!(path = %path.display(), "corrupt score cache, starting empty: {e}");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            games: Arc::new(RwLock::new(games)),
        }
    }

    pub async fn get(&self, game_id: &str) -> Option<ScoredGame> {
        self.games.read().await.get(game_id).cloned()
    }

    /// True once a game has been processed; the monitor's dedupe check
    pub async fn contains(&self, game_id: &str) -> bool {
        self.games.read().await.contains_key(game_id)
    }

    pub async fn len(&self) -> usize {
        self.games.read().await.len()
    }

    /// Ids of every processed game, in no particular order
    pub async fn game_ids(&self) -> Vec<String> {
        self.games.read().await.keys().cloned().collect()
    }

    pub async fn insert(&self, game_id: &str, scored: ScoredGame) -> Result<()> {
        let snapshot = {
            let mut games = self.games.write().await;
            games.insert(game_id.to_string(), scored);
            games.clone()
        };
        self.persist(&snapshot)
    }

    fn persist(&self, games: &HashMap<String, ScoredGame>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(games)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
