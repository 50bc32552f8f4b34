//! Upkeep CLI - maintenance reminders and recommendations from the terminal

use clap::Parser;
use owo_colors::OwoColorize;
use upkeepctl::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = upkeepctl::commands::run(cli).await {
        eprintln!("{} {:#}", "error:".bright_red(), e);
        std::process::exit(1);
    }
}
