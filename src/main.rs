//! Discord Exporter bot - main entry point
//!
//! Connects to Discord and serves the message saving commands.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use discord_exporter::{discord, metrics, Config};

#[derive(Parser)]
#[command(name = "discord_exporter")]
#[command(about = "Discord bot that saves channel history to JSON files", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config.yml (default: ./config.yml, then ../config.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bot token (overrides config.yml)
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Command prefix (overrides config.yml)
    #[arg(long)]
    prefix: Option<String>,

    /// Directory for export files (default: ~/Downloads)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Address to expose Prometheus metrics (e.g., 0.0.0.0:9898)
    #[arg(long, env = "METRICS_ADDR")]
    metrics_addr: Option<String>,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from_file(path)?,
        None => Config::new(),
    };

    if let Some(token) = cli.token.as_deref().filter(|t| !t.is_empty()) {
        config = config.with_token(token);
    }
    if let Some(prefix) = cli.prefix.as_deref() {
        config = config.with_prefix(prefix);
    }
    if let Some(dir) = cli.output_dir.as_deref() {
        config = config.with_output_dir(dir);
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("discord_exporter=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(?config, "Configuration loaded");

    if let Some(addr) = cli.metrics_addr.as_deref() {
        match addr.parse::<SocketAddr>() {
            Ok(socket) => metrics::spawn_metrics_server(socket),
            Err(err) => warn!(%addr, "Invalid metrics address: {}", err),
        }
    }

    discord::run_bot(Arc::new(config)).await?;

    Ok(())
}
