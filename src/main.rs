use clap::{Parser, Subcommand};
use gamepulse::adapters::{EspnClient, SummaryClient, WinProbOutcome, WinProbSource};
use gamepulse::api::{self, AppState};
use gamepulse::cache::ScoreCache;
use gamepulse::config::AppConfig;
use gamepulse::error::{PulseError, Result};
use gamepulse::scheduler::GameMonitor;
use gamepulse::scoring::excitement_score;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gamepulse", about = "NFL game excitement tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitor and query API (default)
    Serve {
        /// Override the configured HTTP port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Score one game and print the result
    Score {
        /// ESPN game id, e.g. 401772783
        #[arg(long)]
        game_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    init_logging(&config.logging.level);

    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("config error: {e}");
        }
        return Err(PulseError::Internal("invalid configuration".to_string()));
    }

    match cli.command {
        Some(Commands::Score { game_id }) => run_score(&config, &game_id).await,
        Some(Commands::Serve { port }) => run_serve(config, port).await,
        None => run_serve(config, None).await,
    }
}

async fn run_serve(config: AppConfig, port_override: Option<u16>) -> Result<()> {
    let port = port_override.unwrap_or(config.server.port);

    let cache = ScoreCache::load(&config.cache.path);
    info!(
        cached_games = cache.len().await,
        path = %config.cache.path,
        "score cache loaded"
    );

    let schedule = Arc::new(EspnClient::new(&config.source)?);
    let winprob: Arc<dyn WinProbSource> = Arc::new(SummaryClient::new(&config.source)?);

    let monitor = GameMonitor::new(
        schedule,
        winprob.clone(),
        cache.clone(),
        config.scheduler.clone(),
    );
    let snapshot_rx = monitor.subscribe();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor_handle = tokio::spawn(monitor.run(shutdown_rx.clone()));

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    let state = AppState::new(cache, winprob, snapshot_rx);
    api::serve(state, port, shutdown_rx).await?;

    let _ = monitor_handle.await;
    info!("shutdown complete");
    Ok(())
}

async fn run_score(config: &AppConfig, game_id: &str) -> Result<()> {
    let winprob = SummaryClient::new(&config.source)?;

    match winprob.fetch_game(game_id).await? {
        WinProbOutcome::NoDataYet => {
            Err(PulseError::GameNotFound(game_id.to_string()))
        }
        WinProbOutcome::Fetched(data) => {
            let score = excitement_score(&data.wp_history, data.home_score, data.away_score);
            println!(
                "{}",
                serde_json::json!({
                    "game_id": game_id,
                    "excitement_score": (score * 10.0).round() / 10.0,
                    "home_score": data.home_score,
                    "away_score": data.away_score,
                    "overtime": data.overtime,
                })
            );
            Ok(())
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gamepulse={level},tower_http=warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
