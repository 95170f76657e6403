//! Lingua content console.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use lingua_kernel::cli::{Cli, run};
use lingua_kernel::{AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let config = Config::from_env().context("failed to load configuration")?;
    debug!(backend = ?config.storage_backend, "configuration loaded");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    if let Err(e) = run(&state, &config.export_dir, cli.command).await {
        eprintln!("error: {}", e.user_message());
        std::process::exit(1);
    }
    Ok(())
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
