//! Upkeep Daemon - maintenance recommendation and reminder service
//!
//! Serves the reminder scheduler and recommendation lifecycle over HTTP.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use upkeep_common::UpkeepConfig;

#[derive(Parser, Debug)]
#[command(name = "upkeepd", version, about = "Upkeep maintenance daemon")]
struct Args {
    /// Configuration file (defaults to $UPKEEP_CONFIG or /etc/upkeep/config.toml)
    #[arg(short, long, env = "UPKEEP_CONFIG")]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn load_config(args: &Args) -> Result<UpkeepConfig> {
    match &args.config {
        Some(path) => {
            let mut config = UpkeepConfig::load_from_path(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            Ok(config)
        }
        None => Ok(UpkeepConfig::load()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,upkeepd=info,upkeep_common=info")),
        )
        .init();

    let config = load_config(&args)?;

    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    info!("Upkeep Daemon v{} starting", upkeep_common::VERSION);
    upkeepd::server::run(config).await?;
    info!("Upkeep Daemon stopped");
    Ok(())
}
