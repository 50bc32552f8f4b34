//! Command execution - one handler per subcommand.

use crate::cli::{Cli, Commands};
use crate::client::{to_pretty_json, RecommendationQuery, UpkeepClient};
use crate::display;
use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use serde::Serialize;
use upkeep_common::api::{HealthResponse, ReminderSummary};
use upkeep_common::NewReminder;

#[derive(Serialize)]
struct StatusOutput<'a> {
    health: &'a HealthResponse,
    reminders: &'a ReminderSummary,
}

/// Print `value` as JSON when `--json` is set, otherwise run `human`
fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", to_pretty_json(value)?);
    } else {
        human(value);
    }
    Ok(())
}

pub async fn run(cli: Cli) -> Result<()> {
    let client = UpkeepClient::new(&cli.url)?;
    let json = cli.json;
    let now = Utc::now();

    match cli.command {
        Commands::Status => {
            let health = client.health().await?;
            let summary = client.summary().await?;
            let status = StatusOutput {
                health: &health,
                reminders: &summary,
            };
            emit(json, &status, |s| display::print_status(s.health, s.reminders))
        }

        Commands::Assets => {
            let assets = client.assets().await?;
            emit(json, &assets, |a| display::print_assets(a))
        }

        Commands::Reminders { filter } => {
            let views = client.reminders(&filter).await?;
            emit(json, &views, |v| display::print_reminders(v, now))
        }

        Commands::Add {
            asset,
            title,
            frequency,
            due,
            priority,
            description,
            once,
        } => {
            let request = NewReminder {
                title: Some(title),
                description,
                asset_id: Some(asset),
                priority,
                frequency: Some(frequency),
                next_due: Some(due),
                recurring: Some(!once),
            };
            let view = client.create_reminder(&request).await?;
            emit(json, &view, |v| {
                println!("{} reminder created", "[OK]".bright_green());
                display::print_reminder(v, now);
            })
        }

        Commands::Complete { id } => {
            let view = client.complete_reminder(&id).await?;
            emit(json, &view, |v| {
                println!("{} cycle completed", "[OK]".bright_green());
                display::print_reminder(v, now);
            })
        }

        Commands::Snooze { id, week } => {
            let duration = if week { "week" } else { "day" };
            let view = client.snooze_reminder(&id, duration).await?;
            emit(json, &view, |v| {
                println!("{} snoozed for a {}", "[OK]".bright_green(), duration);
                display::print_reminder(v, now);
            })
        }

        Commands::Delete { id } => {
            let value = client.delete_reminder(&id).await?;
            emit(json, &value, |_| {
                println!("{} reminder {} deleted", "[OK]".bright_green(), id);
            })
        }

        Commands::Recommend { asset, asset_type } => {
            let response = client.generate(&asset, asset_type.as_deref()).await?;
            emit(json, &response, display::print_generated)
        }

        Commands::Recs {
            priority,
            asset,
            by_priority,
        } => {
            let query = RecommendationQuery {
                priority,
                asset_id: asset,
                order: by_priority.then(|| "priority".to_string()),
            };
            let recs = client.recommendations(&query).await?;
            emit(json, &recs, |r| display::print_recommendations(r))
        }

        Commands::History { asset } => {
            let recs = client.history(asset.as_deref()).await?;
            emit(json, &recs, |r| display::print_recommendations(r))
        }

        Commands::Done { id } => {
            let rec = client.complete_recommendation(&id).await?;
            emit(json, &rec, display::print_recommendation)
        }

        Commands::Dismiss { id } => {
            let rec = client.dismiss_recommendation(&id).await?;
            emit(json, &rec, display::print_recommendation)
        }

        Commands::Advice { asset_type, season } => {
            let advice = client.seasonal_advice(&asset_type, season.as_deref()).await?;
            emit(json, &advice, display::print_advice)
        }

        Commands::Providers { service, location } => {
            let providers = client.providers(&service, location.as_deref()).await?;
            emit(json, &providers, display::print_providers)
        }
    }
}
