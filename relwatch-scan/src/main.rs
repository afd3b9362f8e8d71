//! relwatch - main entry point
//!
//! Watches followed artists for new releases and appends their tracks to a
//! target playlist. By default it scans once at startup and then at each
//! configured daily trigger time until interrupted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use relwatch_common::config::{
    load_toml_config, resolve_config_path, resolve_root_folder, write_toml_config, TomlConfig,
};
use relwatch_scan::config::{ApiSettings, ScanConfig, ACCESS_TOKEN_ENV, PLAYLIST_ID_ENV};
use relwatch_scan::models::RunOutcome;
use relwatch_scan::services::scheduler::DEFAULT_TRIGGER_TIMES;
use relwatch_scan::services::{CheckpointStore, DailySchedule, ScanOrchestrator, SpotifyClient};
use relwatch_scan::SystemClock;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for relwatch
#[derive(Parser, Debug)]
#[command(name = "relwatch")]
#[command(about = "Adds tracks from followed artists' new releases to a playlist")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = "RELWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the scan checkpoint
    #[arg(short, long, env = "RELWATCH_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Target playlist ID
    #[arg(short, long, env = PLAYLIST_ID_ENV)]
    playlist: Option<String>,

    /// OAuth bearer token
    #[arg(long, env = ACCESS_TOKEN_ENV, hide_env_values = true)]
    access_token: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Scan now, then at every scheduled time (default)
    Run,
    /// Scan once and exit
    Once,
    /// Print the current checkpoint
    Status,
    /// Verify the token's user owns the target playlist
    Check,
    /// Write a config file from the current flags and defaults
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref())?;
    let toml_config = load_toml_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    init_tracing(&toml_config);
    info!("Config file: {}", config_path.display());

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    info!("Root folder: {}", root_folder.display());

    let command = args.command.unwrap_or(Command::Run);
    if command == Command::Init {
        return init_config(&args, toml_config, root_folder, &config_path);
    }

    let scan_config = ScanConfig::resolve(&toml_config, &root_folder, args.playlist.as_deref())
        .context("Invalid scan configuration")?;

    match command {
        Command::Status => print_status(&scan_config),
        Command::Check => {
            let client = build_client(&toml_config, args.access_token.as_deref())?;
            check_access(&client, &scan_config.playlist_id).await
        }
        Command::Once => {
            let client = build_client(&toml_config, args.access_token.as_deref())?;
            let orchestrator = ScanOrchestrator::new(Arc::new(client), Arc::new(SystemClock), scan_config);
            run_once(&orchestrator).await
        }
        Command::Run => {
            let schedule = DailySchedule::parse(toml_config.schedule.as_slice())
                .context("Invalid schedule")?;
            let client = build_client(&toml_config, args.access_token.as_deref())?;
            let orchestrator = ScanOrchestrator::new(Arc::new(client), Arc::new(SystemClock), scan_config);
            run_scheduled(&orchestrator, &schedule).await;
            Ok(())
        }
        Command::Init => Ok(()),
    }
}

/// `RUST_LOG` wins; otherwise the configured level for our own crates
fn init_tracing(toml_config: &TomlConfig) {
    let level = toml_config.logging.level.trim().to_lowercase();
    let fallback = format!("relwatch={level},relwatch_scan={level},relwatch_common={level}");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_client(toml_config: &TomlConfig, token_cli: Option<&str>) -> Result<SpotifyClient> {
    let settings = ApiSettings::resolve(toml_config, token_cli)?;
    info!(base_url = %settings.base_url, market = ?settings.market, "Catalog API");
    SpotifyClient::new(&settings).context("Failed to build catalog client")
}

async fn run_once(orchestrator: &ScanOrchestrator) -> Result<()> {
    let report = match orchestrator.run().await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Scan aborted");
            return Err(e).context("Scan failed");
        }
    };
    if report.outcome == RunOutcome::Completed && !report.skipped.is_empty() {
        warn!(skipped = report.skipped.len(), "Some artists or releases were skipped");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Run at startup and at every trigger time until Ctrl+C or SIGTERM.
/// A failed run is logged; the next trigger resumes from the checkpoint.
async fn run_scheduled(orchestrator: &ScanOrchestrator, schedule: &DailySchedule) {
    let triggers: Vec<String> = schedule.times().iter().map(|t| t.format("%H:%M").to_string()).collect();
    info!(triggers = ?triggers, "Scheduler started");

    loop {
        tokio::select! {
            result = orchestrator.run() => {
                if let Err(e) = result {
                    error!(error = %e, "Scan failed, will resume at the next trigger");
                }
            }
            _ = shutdown_signal() => {
                info!("Shutdown during scan, progress is checkpointed");
                return;
            }
        }

        let delay = schedule.delay_until_next(Local::now());
        info!(next_in_secs = delay.as_secs(), "Waiting for next trigger");

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown_signal() => {
                info!("Shutdown complete");
                return;
            }
        }
    }
}

fn init_config(args: &Args, mut toml_config: TomlConfig, root_folder: PathBuf, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    toml_config.root_folder = Some(root_folder);
    if let Some(playlist) = &args.playlist {
        toml_config.playlist_id = Some(playlist.clone());
    }
    if let Some(token) = &args.access_token {
        toml_config.access_token = Some(token.clone());
    }
    if toml_config.schedule.is_empty() {
        toml_config.schedule = DEFAULT_TRIGGER_TIMES.iter().map(|t| t.to_string()).collect();
    }

    write_toml_config(&toml_config, config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Wrote {}", config_path.display());
    Ok(())
}

fn print_status(scan_config: &ScanConfig) -> Result<()> {
    let store = CheckpointStore::new(scan_config.checkpoint_path.clone());
    let state = store.load();
    println!("Checkpoint: {}", store.path().display());
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

async fn check_access(client: &SpotifyClient, playlist_id: &str) -> Result<()> {
    let check = client
        .check_access(playlist_id)
        .await
        .context("Access check failed")?;

    println!(
        "Token user:     {} ({})",
        check.user_name.as_deref().unwrap_or("-"),
        check.user_id
    );
    println!("Playlist:       {}", check.playlist_name);
    println!(
        "Playlist owner: {} ({})",
        check.owner_name.as_deref().unwrap_or("-"),
        check.owner_id
    );

    if check.owner_matches() {
        println!("OK: tracks can be appended");
        Ok(())
    } else {
        anyhow::bail!("token user {} does not own playlist {}", check.user_id, playlist_id)
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
