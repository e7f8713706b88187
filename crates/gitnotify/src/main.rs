use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use gitnotify::config::DEFAULT_CONFIG_PATH;
use gitnotify::{AppState, Config, ConfigStore, LogNotifier, ServerSettings, serve};
use gitnotify_std::{SystemEnv, SystemFs};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gitnotify")]
#[command(about = "Logs notifications for GitHub webhook events", long_about = None)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!(path = %args.config.display(), "Loading configuration");
    let config = Config::load(&SystemFs, &args.config).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    let port = config.listen_port()?;

    info!(
        organization = %config.organization,
        port,
        rules = config.notifications.len(),
        "Configuration loaded"
    );

    let store = Arc::new(ConfigStore::new(config, args.config, Arc::new(SystemFs)));
    let state = AppState::new(
        store,
        Arc::new(LogNotifier),
        ServerSettings::from_env(&SystemEnv),
    );

    serve(state, port).await.context("Server failed")?;
    Ok(())
}
