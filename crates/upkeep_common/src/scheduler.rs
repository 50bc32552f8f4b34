//! Reminder Scheduler - owns the reminder lifecycle.
//!
//! Operations: create, complete (with recurrence), snooze, edit, remove.
//! Every mutation is a read-modify-upsert against the repository; the caller
//! serializes writers (one lock per collection in the daemon).

use crate::asset::AssetCatalog;
use crate::error::{EngineError, EngineResult};
use crate::filter::{filter_reminders, ReminderFilter};
use crate::helpers::{non_blank, parse_timestamp, start_of_day};
use crate::recommendation::Priority;
use crate::reminder::{
    DueStatus, Frequency, NewReminder, RecurrenceAnchor, Reminder, ReminderPatch, SnoozeDuration,
    DEFAULT_UPCOMING_WINDOW_DAYS,
};
use crate::repository::{MemoryRepository, Repository};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Minimum reminder title length
pub const TITLE_MIN_LEN: usize = 3;

/// Counts used by the dashboard badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSummary {
    pub total: usize,
    pub open: usize,
    pub overdue: usize,
    pub upcoming: usize,
}

pub struct ReminderScheduler<R = MemoryRepository<Reminder>> {
    repo: R,
    upcoming_window: Duration,
    anchor: RecurrenceAnchor,
}

impl ReminderScheduler<MemoryRepository<Reminder>> {
    pub fn in_memory() -> Self {
        Self::new(MemoryRepository::new())
    }
}

impl<R: Repository<Reminder>> ReminderScheduler<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            upcoming_window: Duration::days(DEFAULT_UPCOMING_WINDOW_DAYS),
            anchor: RecurrenceAnchor::default(),
        }
    }

    pub fn with_upcoming_window(mut self, days: i64) -> Self {
        self.upcoming_window = Duration::days(days.max(0));
        self
    }

    pub fn with_anchor(mut self, anchor: RecurrenceAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn upcoming_window(&self) -> Duration {
        self.upcoming_window
    }

    pub fn anchor(&self) -> RecurrenceAnchor {
        self.anchor
    }

    pub fn get(&self, id: &str) -> EngineResult<Reminder> {
        self.repo
            .get(id)
            .ok_or_else(|| EngineError::not_found("Reminder", id))
    }

    /// All reminders in creation order
    pub fn list(&self) -> Vec<Reminder> {
        self.repo.list()
    }

    /// Reminders matching `filter` at `now`, in creation order
    pub fn filtered(&self, filter: ReminderFilter, now: DateTime<Utc>) -> Vec<Reminder> {
        filter_reminders(&self.repo.list(), filter, now, self.upcoming_window)
    }

    pub fn summary(&self, now: DateTime<Utc>) -> ReminderSummary {
        let mut summary = ReminderSummary::default();
        for reminder in self.repo.list() {
            summary.total += 1;
            match reminder.due_status(now, self.upcoming_window) {
                DueStatus::Overdue => summary.overdue += 1,
                DueStatus::Upcoming => summary.upcoming += 1,
                DueStatus::Later | DueStatus::Closed => {}
            }
            if !reminder.is_terminal() {
                summary.open += 1;
            }
        }
        summary
    }

    /// Create a reminder for a known asset
    pub fn create(
        &mut self,
        input: NewReminder,
        assets: &dyn AssetCatalog,
        now: DateTime<Utc>,
    ) -> EngineResult<Reminder> {
        let title = validate_title(input.title)?;
        let asset_id = validate_asset(input.asset_id, assets)?;
        let priority = match non_blank(input.priority) {
            Some(raw) => raw.parse::<Priority>()?,
            None => Priority::Medium,
        };
        let frequency = non_blank(input.frequency)
            .ok_or_else(|| EngineError::validation("frequency is required"))?
            .parse::<Frequency>()?;
        let next_due = validate_next_due(input.next_due, now)?;

        let reminder = Reminder {
            id: uuid::Uuid::new_v4().to_string(),
            asset_id,
            title,
            description: non_blank(input.description),
            priority,
            frequency,
            next_due,
            is_active: true,
            completed_at: None,
            snoozed_until: None,
            recurring: input.recurring.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        self.repo.upsert(reminder.clone());
        info!(
            "Created reminder {} '{}' for asset {} ({}, due {})",
            reminder.id,
            reminder.title,
            reminder.asset_id,
            reminder.frequency,
            reminder.next_due.to_rfc3339()
        );
        Ok(reminder)
    }

    /// Mark the current cycle done.
    ///
    /// Recurring reminders are re-armed at the next occurrence with the
    /// snooze cleared; non-recurring ones become terminal.
    pub fn complete(&mut self, id: &str, now: DateTime<Utc>) -> EngineResult<Reminder> {
        let mut reminder = self.get(id)?;

        if reminder.is_terminal() {
            debug!("Reminder {} already completed, nothing to do", id);
            return Ok(reminder);
        }

        if reminder.recurring {
            let next_due = reminder.next_occurrence(now, self.anchor).ok_or_else(|| {
                EngineError::validation(format!("next occurrence of reminder '{}' is out of range", id))
            })?;
            reminder.next_due = next_due;
            reminder.is_active = true;
        } else {
            reminder.is_active = false;
        }
        reminder.completed_at = Some(now);
        reminder.snoozed_until = None;
        reminder.updated_at = now;

        self.repo.upsert(reminder.clone());
        if reminder.is_active {
            info!("Completed reminder {}, next due {}", id, reminder.next_due.to_rfc3339());
        } else {
            info!("Completed reminder {} (final)", id);
        }
        Ok(reminder)
    }

    /// Push the due date to `now + duration`; frequency and completion are untouched
    pub fn snooze(
        &mut self,
        id: &str,
        duration: SnoozeDuration,
        now: DateTime<Utc>,
    ) -> EngineResult<Reminder> {
        let mut reminder = self.get(id)?;

        if reminder.is_terminal() {
            return Err(EngineError::validation(format!(
                "reminder '{}' is completed and cannot be snoozed",
                id
            )));
        }

        let until = now + duration.duration();
        reminder.snoozed_until = Some(until);
        reminder.next_due = until;
        reminder.updated_at = now;

        self.repo.upsert(reminder.clone());
        info!("Snoozed reminder {} until {}", id, until.to_rfc3339());
        Ok(reminder)
    }

    /// Apply a partial update and re-validate the merged record.
    ///
    /// The not-in-the-past rule applies only when `nextDue` is patched, so an
    /// overdue reminder can still be renamed.
    pub fn edit(
        &mut self,
        id: &str,
        patch: ReminderPatch,
        assets: &dyn AssetCatalog,
        now: DateTime<Utc>,
    ) -> EngineResult<Reminder> {
        let mut reminder = self.get(id)?;

        if let Some(title) = patch.title {
            reminder.title = validate_title(Some(title))?;
        }
        if let Some(description) = patch.description {
            reminder.description = non_blank(Some(description));
        }
        if let Some(priority) = patch.priority {
            reminder.priority = priority.parse()?;
        }
        if let Some(frequency) = patch.frequency {
            reminder.frequency = frequency.parse()?;
        }
        if let Some(asset_id) = patch.asset_id {
            reminder.asset_id = validate_asset(Some(asset_id), assets)?;
        }
        if patch.next_due.is_some() {
            reminder.next_due = validate_next_due(patch.next_due, now)?;
            reminder.snoozed_until = None;
        }

        validate_title(Some(reminder.title.clone()))?;
        validate_asset(Some(reminder.asset_id.clone()), assets)?;
        reminder.updated_at = now;

        self.repo.upsert(reminder.clone());
        info!("Updated reminder {}", id);
        Ok(reminder)
    }

    /// Permanently delete a reminder
    pub fn remove(&mut self, id: &str) -> EngineResult<()> {
        match self.repo.delete(id) {
            Some(_) => {
                info!("Deleted reminder {}", id);
                Ok(())
            }
            None => Err(EngineError::not_found("Reminder", id)),
        }
    }
}

fn validate_title(raw: Option<String>) -> EngineResult<String> {
    let title = non_blank(raw).ok_or_else(|| EngineError::validation("title is required"))?;
    if title.chars().count() < TITLE_MIN_LEN {
        return Err(EngineError::validation(format!(
            "title must be at least {} characters",
            TITLE_MIN_LEN
        )));
    }
    Ok(title)
}

fn validate_asset(raw: Option<String>, assets: &dyn AssetCatalog) -> EngineResult<String> {
    let asset_id = non_blank(raw).ok_or_else(|| EngineError::validation("assetId is required"))?;
    if !assets.contains(&asset_id) {
        return Err(EngineError::validation(format!(
            "assetId '{}' does not reference a known asset",
            asset_id
        )));
    }
    Ok(asset_id)
}

/// Due dates may be any time from the start of the current UTC day onward
fn validate_next_due(raw: Option<String>, now: DateTime<Utc>) -> EngineResult<DateTime<Utc>> {
    let raw = non_blank(raw).ok_or_else(|| EngineError::validation("nextDue is required"))?;
    let next_due = parse_timestamp(&raw)
        .ok_or_else(|| EngineError::validation(format!("nextDue '{}' is not a valid date", raw)))?;
    if next_due < start_of_day(now) {
        return Err(EngineError::validation(format!(
            "nextDue {} is in the past",
            next_due.to_rfc3339()
        )));
    }
    Ok(next_due)
}
