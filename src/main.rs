//! Parasail Keeper - unattended daily check-ins for a fleet of Parasail
//! node wallets.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use parasail_keeper::api::ParasailClient;
use parasail_keeper::config::Config;
use parasail_keeper::display::{Dashboard, TracingDashboard};
use parasail_keeper::orchestrator;

/// Application name used for the log directory path
const APP_NAME: &str = "parasail-keeper";

/// Default accounts file, resolved against the working directory
const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug shows countdown ticks)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("logs");
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "parasail-keeper.log");

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_appender))
        .with(filter)
        .init();
}

// All account pipelines interleave on a single event loop; remote calls and
// timer ticks are the only suspension points.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("Parasail keeper starting");

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load accounts from {}", config_path.display()))?;
    info!(accounts = config.accounts.len(), "Account roster loaded");

    let client = Arc::new(ParasailClient::new()?);
    let dashboard: Arc<dyn Dashboard> = Arc::new(TracingDashboard);

    orchestrator::run(client, config.accounts, dashboard).await?;

    info!("Parasail keeper shutting down");
    Ok(())
}
