//! CLI - Command-line argument parsing
//!
//! Keeps argument parsing separate from execution logic.

use clap::{Parser, Subcommand};

/// Default daemon address
pub const DEFAULT_URL: &str = "http://127.0.0.1:7878";

/// Upkeep CLI
#[derive(Parser, Debug)]
#[command(name = "upkeepctl")]
#[command(about = "Upkeep - maintenance reminders and recommendations", long_about = None)]
#[command(version = upkeep_common::VERSION)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Daemon base URL
    #[arg(long, global = true, env = "UPKEEP_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Print raw JSON responses
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show daemon health and reminder counts
    Status,

    /// List assets
    Assets,

    /// List reminders
    Reminders {
        /// all | overdue | upcoming
        #[arg(long, short, default_value = "all")]
        filter: String,
    },

    /// Create a reminder
    Add {
        /// Asset id
        #[arg(long)]
        asset: String,

        #[arg(long)]
        title: String,

        /// WEEKLY | MONTHLY | QUARTERLY | YEARLY
        #[arg(long)]
        frequency: String,

        /// First due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: String,

        /// HIGH | MEDIUM | LOW
        #[arg(long)]
        priority: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Close the reminder after the first completion
        #[arg(long)]
        once: bool,
    },

    /// Mark a reminder's current cycle done
    Complete { id: String },

    /// Snooze a reminder for a day
    Snooze {
        id: String,

        /// Snooze for a week instead
        #[arg(long)]
        week: bool,
    },

    /// Delete a reminder
    Delete { id: String },

    /// Generate recommendations for an asset
    Recommend {
        /// Asset id
        asset: String,

        /// Asset type for an asset not in the catalog
        #[arg(long = "type")]
        asset_type: Option<String>,
    },

    /// List active recommendations
    Recs {
        /// HIGH | MEDIUM | LOW | all
        #[arg(long, short)]
        priority: Option<String>,

        /// Only this asset
        #[arg(long)]
        asset: Option<String>,

        /// Sort HIGH first instead of insertion order
        #[arg(long)]
        by_priority: bool,
    },

    /// Show completed and dismissed recommendations too
    History {
        #[arg(long)]
        asset: Option<String>,
    },

    /// Mark a recommendation completed
    Done { id: String },

    /// Dismiss a recommendation
    Dismiss { id: String },

    /// Seasonal maintenance advice
    Advice {
        /// CAR | GENERATOR | APPLIANCE | OTHER
        asset_type: String,

        /// DRY | WET | HARMATTAN (defaults to the current season)
        #[arg(long)]
        season: Option<String>,
    },

    /// Find local service providers
    Providers {
        service: String,

        #[arg(long)]
        location: Option<String>,
    },
}
