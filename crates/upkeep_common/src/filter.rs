//! Read-only filtered views over reminders and recommendations.
//!
//! All filters are stable: output preserves input order. Nothing here
//! mutates or caches; "now" is always a parameter.

use crate::error::EngineError;
use crate::recommendation::{Priority, Recommendation};
use crate::reminder::{DueStatus, Reminder};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Reminder view predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReminderFilter {
    /// Every reminder with an open cycle (terminally completed ones are hidden)
    #[default]
    All,
    Overdue,
    Upcoming,
}

impl ReminderFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderFilter::All => "all",
            ReminderFilter::Overdue => "overdue",
            ReminderFilter::Upcoming => "upcoming",
        }
    }

    pub fn matches(&self, reminder: &Reminder, now: DateTime<Utc>, window: Duration) -> bool {
        let status = reminder.due_status(now, window);
        match self {
            ReminderFilter::All => status != DueStatus::Closed,
            ReminderFilter::Overdue => status == DueStatus::Overdue,
            ReminderFilter::Upcoming => status == DueStatus::Upcoming,
        }
    }
}

impl FromStr for ReminderFilter {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ReminderFilter::All),
            "overdue" => Ok(ReminderFilter::Overdue),
            "upcoming" => Ok(ReminderFilter::Upcoming),
            _ => Err(EngineError::validation(format!(
                "filter must be one of all, overdue, upcoming (got '{}')",
                s
            ))),
        }
    }
}

/// Recommendation priority predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub fn matches(&self, priority: Priority) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(p) => *p == priority,
        }
    }
}

impl From<Option<Priority>> for PriorityFilter {
    fn from(priority: Option<Priority>) -> Self {
        priority.map(PriorityFilter::Only).unwrap_or_default()
    }
}

impl FromStr for PriorityFilter {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(PriorityFilter::All)
        } else {
            s.parse().map(PriorityFilter::Only)
        }
    }
}

/// Stable filter of reminders by due classification
pub fn filter_reminders(
    reminders: &[Reminder],
    filter: ReminderFilter,
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<Reminder> {
    reminders
        .iter()
        .filter(|r| filter.matches(r, now, window))
        .cloned()
        .collect()
}

/// Stable filter of recommendations by priority
pub fn filter_recommendations(recs: &[Recommendation], priority: PriorityFilter) -> Vec<Recommendation> {
    recs.iter()
        .filter(|r| priority.matches(r.priority))
        .cloned()
        .collect()
}

/// Stable sort: priority (HIGH first), ties by `created_at` ascending
pub fn sort_by_priority(recs: &mut [Recommendation]) {
    recs.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}
