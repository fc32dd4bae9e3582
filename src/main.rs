//! Frenzy Angler - headless auto fishing bot for Fishing Frenzy
//!
//! Reads one bearer token per line from `token.txt`, optional tunables from
//! `config/settings.json`, and fishes with every account until interrupted.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use frenzy_angler::utils::logging::init_logging;
use frenzy_angler::utils::path::get_log_dir;
use frenzy_angler::utils::settings::get_settings_path;
use frenzy_angler::utils::tokens::get_tokens_path;
use frenzy_angler::{
    load_settings, load_tokens, InventoryClient, LiveBackend, SessionService, Supervisor,
    WsConnector,
};

#[derive(Debug, Parser)]
#[command(version, about = "Headless auto fishing bot for Fishing Frenzy")]
struct Cli {
    /// Token file, one bearer token per line
    #[arg(short, long)]
    tokens: Option<PathBuf>,

    /// Settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    print_config: bool,
}

async fn run(cli: Cli) -> Result<()> {
    let settings_path = cli.config.unwrap_or_else(get_settings_path);
    let settings = load_settings(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let tokens_path = cli.tokens.unwrap_or_else(get_tokens_path);
    let tokens = load_tokens(&tokens_path).context("Failed to load account tokens")?;

    let inventory = InventoryClient::new(settings.api_base_url.clone(), settings.http_timeout())
        .context("Failed to build HTTP client")?;
    let sessions = SessionService::new(
        WsConnector::new(settings.ws_url.clone()),
        settings.session_config(),
    );
    let backend = Arc::new(LiveBackend::new(inventory, sessions));

    tracing::info!(
        "Fishing with policy {:?} (default range {}, 5x: {})",
        settings.tier_policy,
        settings.fishing_range,
        settings.is_5x
    );

    let mut supervisor = Supervisor::start(
        backend,
        settings.scheduler_config(),
        settings.restart_delay(),
        tokens,
    )?;

    tokio::select! {
        _ = supervisor.wait() => {
            tracing::warn!("All account tasks ended");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            tracing::info!("Ctrl-C received");
        }
    }

    supervisor.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&get_log_dir());

    println!("Frenzy Angler v{}", env!("CARGO_PKG_VERSION"));
    println!("================================");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
