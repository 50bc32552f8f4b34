//! Display helpers for upkeepctl output.
//!
//! ASCII only. Colour marks urgency; the text alone still reads correctly.

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use upkeep_common::api::{
    GenerateResponse, HealthResponse, ProvidersResponse, ReminderSummary, ReminderView,
    SeasonalAdviceResponse,
};
use upkeep_common::{AssetDescriptor, DueStatus, Priority, Recommendation, ReminderState};

const HR: &str = "----------------------------------------";

/// Relative description of a due date ("in 3 days", "2 days overdue")
pub fn format_due(next_due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (next_due.date_naive() - now.date_naive()).num_days();
    match days {
        0 if next_due < now => "due earlier today".to_string(),
        0 => "due today".to_string(),
        1 => "due tomorrow".to_string(),
        -1 => "1 day overdue".to_string(),
        d if d > 1 => format!("in {} days", d),
        d => format!("{} days overdue", -d),
    }
}

fn priority_tag(priority: Priority) -> String {
    let tag = format!("[{}]", priority.as_str());
    match priority {
        Priority::High => tag.bright_red().to_string(),
        Priority::Medium => tag.yellow().to_string(),
        Priority::Low => tag.dimmed().to_string(),
    }
}

fn due_tag(status: DueStatus) -> String {
    match status {
        DueStatus::Overdue => "OVERDUE".bright_red().to_string(),
        DueStatus::Upcoming => "UPCOMING".yellow().to_string(),
        DueStatus::Later => "LATER".green().to_string(),
        DueStatus::Closed => "CLOSED".dimmed().to_string(),
    }
}

fn print_kv(key: &str, value: &str) {
    println!("  {:14} {}", key.dimmed(), value);
}

// ============================================================================
// Status
// ============================================================================

pub fn print_status(health: &HealthResponse, summary: &ReminderSummary) {
    println!("\n{} v{}", "upkeepd".bold(), health.version);
    println!("{}", HR.dimmed());

    print_kv("status", &health.status.green().to_string());
    print_kv("uptime", &format!("{}s", health.uptime_seconds));
    let provider = if health.provider.enabled {
        format!("{} ({})", health.provider.backend, health.provider.model)
    } else {
        "rule table only".to_string()
    };
    print_kv("provider", &provider);
    println!();

    print_kv("reminders", &summary.total.to_string());
    print_kv("open", &summary.open.to_string());
    let overdue = if summary.overdue > 0 {
        summary.overdue.bright_red().to_string()
    } else {
        summary.overdue.to_string()
    };
    print_kv("overdue", &overdue);
    print_kv("upcoming", &summary.upcoming.to_string());
    println!();
}

// ============================================================================
// Assets and Reminders
// ============================================================================

pub fn print_assets(assets: &[AssetDescriptor]) {
    if assets.is_empty() {
        println!("No assets.");
        return;
    }
    for asset in assets {
        println!(
            "{}  {:10} {}",
            asset.id.cyan(),
            asset.asset_type.as_str(),
            asset.display_name()
        );
        if let Some(date) = asset.purchase_date {
            println!("    purchased {}", date.format("%Y-%m-%d"));
        }
    }
}

pub fn print_reminder(view: &ReminderView, now: DateTime<Utc>) {
    let reminder = &view.reminder;
    let asset = view
        .asset
        .as_ref()
        .map(|a| a.display_name())
        .unwrap_or_else(|| reminder.asset_id.clone());

    println!(
        "{} {} {}",
        priority_tag(reminder.priority),
        reminder.title.bold(),
        format!("({})", asset).dimmed()
    );

    let when = match view.state {
        ReminderState::CompletedTerminal => "completed".to_string(),
        ReminderState::Snoozed => format!(
            "snoozed, {}",
            format_due(reminder.next_due, now)
        ),
        _ => format_due(reminder.next_due, now),
    };
    println!(
        "    {}  {}  {}  {}",
        due_tag(view.due_status),
        reminder.frequency.as_str(),
        reminder.next_due.format("%Y-%m-%d"),
        when
    );
    println!("    {}", reminder.id.dimmed());
}

pub fn print_reminders(views: &[ReminderView], now: DateTime<Utc>) {
    if views.is_empty() {
        println!("No reminders.");
        return;
    }
    for view in views {
        print_reminder(view, now);
    }
}

// ============================================================================
// Recommendations
// ============================================================================

pub fn print_recommendation(rec: &Recommendation) {
    println!("{} {}", priority_tag(rec.priority), rec.title.bold());
    println!("    {}", rec.description);

    let mut meta = vec![rec.category.as_str().to_string(), rec.timeframe.clone()];
    if let Some(cost) = &rec.estimated_cost {
        meta.push(cost.clone());
    }
    if rec.status.is_terminal() {
        meta.push(rec.status.as_str().to_string());
    }
    println!("    {}", meta.join("  |  ").dimmed());
    println!("    {}", rec.id.dimmed());
}

pub fn print_recommendations(recs: &[Recommendation]) {
    if recs.is_empty() {
        println!("No recommendations.");
        return;
    }
    for rec in recs {
        print_recommendation(rec);
    }
}

pub fn print_generated(response: &GenerateResponse) {
    if response.source.is_fallback() {
        println!(
            "{} provider unavailable, using built-in recommendations",
            "[NOTE]".yellow()
        );
    }
    print_recommendations(&response.recommendations);
    println!(
        "{}",
        format!(
            "{} added, {} replaced, {} skipped",
            response.merge.added, response.merge.replaced, response.merge.skipped
        )
        .dimmed()
    );
}

// ============================================================================
// Advice
// ============================================================================

pub fn print_advice(advice: &SeasonalAdviceResponse) {
    println!("{} season, {}", advice.season.bold(), advice.asset_type);
    for tip in &advice.advice {
        println!("  * {}", tip);
    }
}

pub fn print_providers(response: &ProvidersResponse) {
    if response.providers.is_empty() {
        println!("No providers found.");
        return;
    }
    for provider in &response.providers {
        let rating = provider
            .rating
            .map(|r| format!("  {:.1}/5", r))
            .unwrap_or_default();
        println!("{}{}", provider.name.bold(), rating);
        println!("    {}", provider.location);
        println!("    {}", provider.services.join(", ").dimmed());
        if let Some(contact) = &provider.contact {
            println!("    {}", contact.cyan());
        }
    }
}
