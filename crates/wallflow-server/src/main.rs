use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wallflow_core::WallflowConfig;
use wallflow_server::{AppState, WallflowServer};

#[derive(Debug, Parser)]
#[command(name = "wallflow-server", version, about = "Favorites API for the wallflow gallery")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "WALLFLOW_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = WallflowConfig::load(args.config.as_deref())?;
    let store = wallflow_store::create_store(&config.store)?;

    WallflowServer::new(AppState::new(config, store)).run().await
}
