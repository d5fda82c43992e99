use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use frontierwatch_common::Config;
use frontierwatch_scout::scout::Scout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Collect from every source and write the raw table only.
    Scrape,
    /// Collect, classify, geocode, render and notify.
    Full,
}

#[derive(Debug, Parser)]
#[command(name = "frontierwatch", about = "Border-region incident monitor")]
struct Cli {
    #[arg(value_enum, default_value_t = Mode::Full)]
    mode: Mode,

    /// TOML config file. Built-in defaults apply when it does not exist.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("frontierwatch=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    info!(mode = ?cli.mode, config = %cli.config.display(), "FrontierWatch starting...");

    let config = Config::load(&cli.config).context("Invalid configuration")?;
    let scout = Scout::from_config(&config)?;

    let stats = match cli.mode {
        Mode::Scrape => scout.scrape().await,
        Mode::Full => scout.run().await,
    };

    info!("Run complete");
    println!("{stats}");
    Ok(())
}
