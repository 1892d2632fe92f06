use chrono::Duration;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// ESPN scoreboard endpoint (schedule + live status)
    #[serde(default = "default_scoreboard_url")]
    pub scoreboard_url: String,
    /// ESPN game summary endpoint (win probability trajectory)
    #[serde(default = "default_summary_url")]
    pub summary_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

fn default_scoreboard_url() -> String {
    "https://site.api.espn.com/apis/site/v2/sports/football/nfl/scoreboard".to_string()
}

fn default_summary_url() -> String {
    "https://site.api.espn.com/apis/site/v2/sports/football/nfl/summary".to_string()
}

fn default_source_timeout() -> u64 {
    10
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            scoreboard_url: default_scoreboard_url(),
            summary_url: default_summary_url(),
            timeout_secs: default_source_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Kickoffs within this many minutes of a slot anchor share the slot
    #[serde(default = "default_slot_proximity")]
    pub slot_proximity_mins: i64,
    /// Check window opens this many minutes after the slot anchor
    #[serde(default = "default_window_open")]
    pub window_open_mins: i64,
    /// Check window closes this many minutes after the slot anchor
    #[serde(default = "default_window_close")]
    pub window_close_mins: i64,
    /// Full schedule refresh cadence; also the idle fallback sleep
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Sleep between polls while inside a check window
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Sleep after a failed iteration, instead of the decided interval
    #[serde(default = "default_recovery_interval")]
    pub recovery_interval_secs: u64,
}

fn default_slot_proximity() -> i64 {
    30
}

fn default_window_open() -> i64 {
    180
}

fn default_window_close() -> i64 {
    240
}

fn default_refresh_interval() -> u64 {
    21600
}

fn default_poll_interval() -> u64 {
    300
}

fn default_recovery_interval() -> u64 {
    300
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            slot_proximity_mins: default_slot_proximity(),
            window_open_mins: default_window_open(),
            window_close_mins: default_window_close(),
            refresh_interval_secs: default_refresh_interval(),
            poll_interval_secs: default_poll_interval(),
            recovery_interval_secs: default_recovery_interval(),
        }
    }
}

impl SchedulerConfig {
    pub fn slot_proximity(&self) -> Duration {
        Duration::minutes(self.slot_proximity_mins)
    }

    pub fn window_open_offset(&self) -> Duration {
        Duration::minutes(self.window_open_mins)
    }

    pub fn window_close_offset(&self) -> Duration {
        Duration::minutes(self.window_close_mins)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::seconds(self.refresh_interval_secs as i64)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// JSON file holding processed game scores
    #[serde(default = "default_cache_path")]
    pub path: String,
}

fn default_cache_path() -> String {
    "data/score_cache.json".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("GAMEPULSE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (GAMEPULSE_SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("GAMEPULSE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.scheduler.slot_proximity_mins <= 0 {
            errors.push("slot_proximity_mins must be positive".to_string());
        }

        if self.scheduler.window_close_mins <= self.scheduler.window_open_mins {
            errors.push("window_close_mins must be greater than window_open_mins".to_string());
        }

        if self.scheduler.poll_interval_secs == 0 {
            errors.push("poll_interval_secs must be positive".to_string());
        }

        if self.scheduler.refresh_interval_secs == 0 {
            errors.push("refresh_interval_secs must be positive".to_string());
        }

        if self.source.timeout_secs == 0 {
            errors.push("source timeout_secs must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
