//! Reminder records, recurrence arithmetic and due-date classification.
//!
//! Recurrence uses calendar arithmetic: adding a month to Jan 31 lands on
//! the last day of February, never in March.

use crate::error::EngineError;
use crate::recommendation::Priority;
use crate::repository::Record;
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default width of the "upcoming" window
pub const DEFAULT_UPCOMING_WINDOW_DAYS: i64 = 7;

/// How often a reminder recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Quarterly => "QUARTERLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    /// Add one interval to `from`. `None` only if the result is out of range.
    pub fn advance(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Frequency::Weekly => from.checked_add_signed(Duration::days(7)),
            Frequency::Monthly => from.checked_add_months(Months::new(1)),
            Frequency::Quarterly => from.checked_add_months(Months::new(3)),
            Frequency::Yearly => from.checked_add_months(Months::new(12)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "QUARTERLY" => Ok(Frequency::Quarterly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(EngineError::validation(format!(
                "frequency must be one of WEEKLY, MONTHLY, QUARTERLY, YEARLY (got '{}')",
                s
            ))),
        }
    }
}

/// Fixed snooze offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnoozeDuration {
    Day,
    Week,
}

impl SnoozeDuration {
    pub fn duration(&self) -> Duration {
        match self {
            SnoozeDuration::Day => Duration::days(1),
            SnoozeDuration::Week => Duration::days(7),
        }
    }
}

impl FromStr for SnoozeDuration {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(SnoozeDuration::Day),
            "week" => Ok(SnoozeDuration::Week),
            _ => Err(EngineError::validation(format!(
                "snooze duration must be 'day' or 'week' (got '{}')",
                s
            ))),
        }
    }
}

/// Which instant the next occurrence is counted from after completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceAnchor {
    /// `nextDue = completedAt + interval`
    #[default]
    Completion,
    /// `nextDue = previous nextDue + interval`, repeated until after completion
    DueDate,
}

/// Lifecycle state derived from the stored fields.
///
/// A deleted reminder has no state: it is simply absent from the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderState {
    Active,
    Snoozed,
    CompletedRecurring,
    CompletedTerminal,
}

/// Due-date classification relative to `now`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DueStatus {
    Overdue,
    Upcoming,
    Later,
    /// Terminally completed; never overdue or upcoming
    Closed,
}

/// Classify a due date. Pure function of `(next_due, now, window)`.
///
/// OVERDUE iff `next_due < now`; UPCOMING iff `now <= next_due <= now + window`.
pub fn classify_due(next_due: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> DueStatus {
    if next_due < now {
        DueStatus::Overdue
    } else if next_due <= now + window {
        DueStatus::Upcoming
    } else {
        DueStatus::Later
    }
}

fn default_recurring() -> bool {
    true
}

/// A scheduled, recurring maintenance obligation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub asset_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: Priority,
    pub frequency: Frequency,
    pub next_due: DateTime<Utc>,
    pub is_active: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub snoozed_until: Option<DateTime<Utc>>,
    #[serde(default = "default_recurring")]
    pub recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reminder {
    /// Completed with no further cycle
    pub fn is_terminal(&self) -> bool {
        !self.is_active && self.completed_at.is_some()
    }

    pub fn state(&self, now: DateTime<Utc>) -> ReminderState {
        if self.is_terminal() {
            ReminderState::CompletedTerminal
        } else if self.snoozed_until.is_some_and(|until| until > now) {
            ReminderState::Snoozed
        } else if self.completed_at.is_some() {
            ReminderState::CompletedRecurring
        } else {
            ReminderState::Active
        }
    }

    /// Overdue/upcoming classification for the current cycle
    pub fn due_status(&self, now: DateTime<Utc>, window: Duration) -> DueStatus {
        if self.is_terminal() {
            DueStatus::Closed
        } else {
            classify_due(self.next_due, now, window)
        }
    }

    /// Due date of the cycle following a completion at `completed_at`
    pub fn next_occurrence(
        &self,
        completed_at: DateTime<Utc>,
        anchor: RecurrenceAnchor,
    ) -> Option<DateTime<Utc>> {
        match anchor {
            RecurrenceAnchor::Completion => self.frequency.advance(completed_at),
            RecurrenceAnchor::DueDate => {
                let mut next = self.frequency.advance(self.next_due)?;
                while next <= completed_at {
                    next = self.frequency.advance(next)?;
                }
                Some(next)
            }
        }
    }
}

impl Record for Reminder {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Reminder creation request. Enum and date fields arrive as text so that
/// bad values surface as validation errors rather than decode failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReminder {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub next_due: Option<String>,
    #[serde(default)]
    pub recurring: Option<bool>,
}

/// Partial update of a reminder's mutable fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub next_due: Option<String>,
    #[serde(default)]
    pub asset_id: Option<String>,
}

impl ReminderPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.frequency.is_none()
            && self.next_due.is_none()
            && self.asset_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn reminder(frequency: Frequency, next_due: DateTime<Utc>) -> Reminder {
        Reminder {
            id: "r1".to_string(),
            asset_id: "a1".to_string(),
            title: "Oil change".to_string(),
            description: None,
            priority: Priority::Medium,
            frequency,
            next_due,
            is_active: true,
            completed_at: None,
            snoozed_until: None,
            recurring: true,
            created_at: at(2025, 1, 1),
            updated_at: at(2025, 1, 1),
        }
    }

    #[test]
    fn test_weekly_adds_seven_days() {
        assert_eq!(Frequency::Weekly.advance(at(2025, 12, 29)), Some(at(2026, 1, 5)));
    }

    #[test]
    fn test_monthly_clamps_to_month_end() {
        assert_eq!(Frequency::Monthly.advance(at(2025, 1, 31)), Some(at(2025, 2, 28)));
        assert_eq!(Frequency::Monthly.advance(at(2024, 1, 31)), Some(at(2024, 2, 29)));
        assert_eq!(Frequency::Monthly.advance(at(2025, 12, 15)), Some(at(2026, 1, 15)));
    }

    #[test]
    fn test_quarterly_and_yearly() {
        assert_eq!(Frequency::Quarterly.advance(at(2025, 11, 30)), Some(at(2026, 2, 28)));
        assert_eq!(Frequency::Yearly.advance(at(2024, 2, 29)), Some(at(2025, 2, 28)));
    }

    #[test]
    fn test_advance_keeps_time_of_day() {
        let from = Utc.with_ymd_and_hms(2025, 7, 20, 14, 30, 0).unwrap();
        let next = Frequency::Monthly.advance(from).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 8, 20, 14, 30, 0).unwrap());
    }

    #[test]
    fn test_classify_boundaries() {
        let now = at(2025, 7, 15);
        let window = Duration::days(7);
        let second = Duration::seconds(1);

        assert_eq!(classify_due(now - second, now, window), DueStatus::Overdue);
        assert_eq!(classify_due(now, now, window), DueStatus::Upcoming);
        assert_eq!(classify_due(now + second, now, window), DueStatus::Upcoming);
        assert_eq!(classify_due(now + window, now, window), DueStatus::Upcoming);
        assert_eq!(classify_due(now + window + second, now, window), DueStatus::Later);
    }

    #[test]
    fn test_state_derivation() {
        let now = at(2025, 7, 15);
        let mut r = reminder(Frequency::Monthly, at(2025, 8, 1));
        assert_eq!(r.state(now), ReminderState::Active);

        r.snoozed_until = Some(at(2025, 7, 16));
        assert_eq!(r.state(now), ReminderState::Snoozed);
        // Snooze window elapsed
        assert_eq!(r.state(at(2025, 7, 17)), ReminderState::Active);

        r.snoozed_until = None;
        r.completed_at = Some(at(2025, 7, 10));
        assert_eq!(r.state(now), ReminderState::CompletedRecurring);

        r.is_active = false;
        assert_eq!(r.state(now), ReminderState::CompletedTerminal);
        assert_eq!(r.due_status(now, Duration::days(7)), DueStatus::Closed);
    }

    #[test]
    fn test_next_occurrence_anchors() {
        let r = reminder(Frequency::Monthly, at(2025, 7, 15));
        let completed = at(2025, 7, 20);

        assert_eq!(r.next_occurrence(completed, RecurrenceAnchor::Completion), Some(at(2025, 8, 20)));
        assert_eq!(r.next_occurrence(completed, RecurrenceAnchor::DueDate), Some(at(2025, 8, 15)));
    }

    #[test]
    fn test_due_date_anchor_catches_up() {
        let r = reminder(Frequency::Weekly, at(2025, 7, 1));
        let completed = at(2025, 7, 20);
        // 7/8, 7/15 are still in the past; 7/22 is the first future slot
        assert_eq!(r.next_occurrence(completed, RecurrenceAnchor::DueDate), Some(at(2025, 7, 22)));
    }

    #[test]
    fn test_snooze_parse() {
        assert_eq!("Week".parse::<SnoozeDuration>().unwrap(), SnoozeDuration::Week);
        assert!("month".parse::<SnoozeDuration>().is_err());
        assert_eq!(SnoozeDuration::Day.duration(), Duration::days(1));
    }

    #[test]
    fn test_reminder_json_defaults_recurring() {
        let json = serde_json::json!({
            "id": "1",
            "assetId": "asset-1",
            "title": "Change Engine Oil",
            "priority": "MEDIUM",
            "frequency": "MONTHLY",
            "nextDue": "2025-07-15T00:00:00Z",
            "isActive": true,
            "createdAt": "2025-07-01T00:00:00Z",
            "updatedAt": "2025-07-01T00:00:00Z"
        });
        let r: Reminder = serde_json::from_value(json).unwrap();
        assert!(r.recurring);
        assert!(r.completed_at.is_none());
        assert_eq!(r.frequency, Frequency::Monthly);
    }
}
