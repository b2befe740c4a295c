use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wallflow_core::WallflowConfig;
use wallflow_feed::{RandomSource, WaifuClient};
use wallflow_gallery::ColumnStrategy;

mod commands;
mod render;

use commands::browse::GalleryOptions;

#[derive(Parser, Debug)]
#[command(name = "wallflow", version, about = "Browse and download wallpapers from the terminal")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true, env = "WALLFLOW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Page through the default feed and print a masonry grid.
    Browse {
        /// Pages to load.
        #[arg(long, default_value_t = 1)]
        pages: u32,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Search by tag and print a masonry grid.
    Search {
        /// Tag to search for, e.g. "maid".
        tag: String,

        /// Pages to load.
        #[arg(long, default_value_t = 1)]
        pages: u32,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Download one image as wallpaper-{id}.jpg.
    Download {
        /// Image URL.
        url: String,

        /// Image id used in the file name. Defaults to the URL's file stem.
        #[arg(long)]
        id: Option<String>,

        /// Target directory.
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct ViewArgs {
    /// Container width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Column rule. Defaults to fluid for browse, breakpoint for search.
    #[arg(long, value_enum)]
    columns: Option<ColumnMode>,

    /// Seed for flag and height draws.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the grid as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ColumnMode {
    Fluid,
    Breakpoint,
}

impl From<ColumnMode> for ColumnStrategy {
    fn from(mode: ColumnMode) -> Self {
        match mode {
            ColumnMode::Fluid => ColumnStrategy::Fluid,
            ColumnMode::Breakpoint => ColumnStrategy::Breakpoint,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = WallflowConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.cmd {
        Command::Browse { pages, view } => {
            gallery(&config, None, pages, view, ColumnStrategy::Fluid).await?;
        }
        Command::Search { tag, pages, view } => {
            gallery(&config, Some(tag), pages, view, ColumnStrategy::Breakpoint).await?;
        }
        Command::Download { url, id, dir } => {
            let client = WaifuClient::new(config.feed.clone())?;
            let path = commands::download::run(&client, &url, id.as_deref(), &dir).await?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

async fn gallery(
    config: &WallflowConfig,
    tag: Option<String>,
    pages: u32,
    view: ViewArgs,
    default_strategy: ColumnStrategy,
) -> anyhow::Result<()> {
    let rng = match view.seed {
        Some(seed) => RandomSource::seeded(seed),
        None => RandomSource::from_entropy(),
    };
    let client = WaifuClient::with_rng(config.feed.clone(), rng.clone())?;

    let options = GalleryOptions {
        tag,
        pages,
        width: view.width,
        strategy: view.columns.map(Into::into).unwrap_or(default_strategy),
        json: view.json,
    };

    let mut stdout = std::io::stdout().lock();
    commands::browse::run(Arc::new(client), config.layout, &rng, &options, &mut stdout).await?;
    Ok(())
}
