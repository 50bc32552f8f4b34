//! Recommendation records and their enums.

use crate::error::{EngineError, EngineResult};
use crate::repository::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Priority shared by recommendations and reminders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }

    /// Sort rank, most urgent first
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    /// Coerce untrusted provider text; anything unrecognised becomes MEDIUM
    pub fn coerce(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Priority::High),
            "MEDIUM" => Ok(Priority::Medium),
            "LOW" => Ok(Priority::Low),
            _ => Err(EngineError::validation(format!(
                "priority must be one of HIGH, MEDIUM, LOW (got '{}')",
                s
            ))),
        }
    }
}

/// Kind of maintenance work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Preventive,
    #[default]
    Routine,
    Urgent,
    Seasonal,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Preventive => "PREVENTIVE",
            Category::Routine => "ROUTINE",
            Category::Urgent => "URGENT",
            Category::Seasonal => "SEASONAL",
        }
    }

    /// Coerce untrusted provider text; anything unrecognised becomes ROUTINE
    pub fn coerce(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
            Some("PREVENTIVE") => Category::Preventive,
            Some("URGENT") => Category::Urgent,
            Some("SEASONAL") => Category::Seasonal,
            _ => Category::Routine,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recommendation status; PENDING is the only non-terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationStatus {
    #[default]
    Pending,
    Completed,
    Dismissed,
}

impl RecommendationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationStatus::Pending => "PENDING",
            RecommendationStatus::Completed => "COMPLETED",
            RecommendationStatus::Dismissed => "DISMISSED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecommendationStatus::Pending)
    }
}

impl fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecommendationStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "Done" is the legacy name used by the dashboard for COMPLETED
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(RecommendationStatus::Pending),
            "COMPLETED" | "DONE" => Ok(RecommendationStatus::Completed),
            "DISMISSED" => Ok(RecommendationStatus::Dismissed),
            _ => Err(EngineError::validation(format!(
                "status must be one of PENDING, COMPLETED, DISMISSED (got '{}')",
                s
            ))),
        }
    }
}

/// A suggested maintenance action for one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub asset_id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<String>,
    pub timeframe: String,
    pub status: RecommendationStatus,
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn is_active(&self) -> bool {
        self.status == RecommendationStatus::Pending
    }

    /// Move to a terminal status.
    ///
    /// Returns `Ok(false)` when already in `target` (idempotent no-op).
    /// PENDING is never a valid target and terminal states never change.
    pub(crate) fn transition(&mut self, target: RecommendationStatus) -> EngineResult<bool> {
        if target == RecommendationStatus::Pending {
            return Err(EngineError::validation(format!(
                "recommendation '{}' cannot be returned to PENDING",
                self.id
            )));
        }
        if self.status == target {
            return Ok(false);
        }
        if self.status.is_terminal() {
            return Err(EngineError::validation(format!(
                "recommendation '{}' is already {} and cannot become {}",
                self.id, self.status, target
            )));
        }
        self.status = target;
        Ok(true)
    }
}

impl Record for Recommendation {
    fn id(&self) -> &str {
        &self.id
    }
}
