//! Seasonal maintenance advice for West-African seasons.

use crate::asset::AssetType;
use crate::error::EngineError;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Season {
    Dry,
    Wet,
    Harmattan,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Dry => "DRY",
            Season::Wet => "WET",
            Season::Harmattan => "HARMATTAN",
        }
    }

    /// Season for a calendar month (1-12). Dec-Feb harmattan, Apr-Oct rains.
    pub fn for_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Harmattan,
            4..=10 => Season::Wet,
            _ => Season::Dry,
        }
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self::for_month(now.month())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Season {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRY" => Ok(Season::Dry),
            "WET" | "RAINY" => Ok(Season::Wet),
            "HARMATTAN" => Ok(Season::Harmattan),
            _ => Err(EngineError::validation(format!(
                "season must be one of DRY, WET, HARMATTAN (got '{}')",
                s
            ))),
        }
    }
}

/// Three fixed tips per (type, season). OTHER uses the CAR tips.
pub fn seasonal_advice(asset_type: AssetType, season: Season) -> Vec<&'static str> {
    let tips: [&'static str; 3] = match (asset_type, season) {
        (AssetType::Generator, Season::Dry) => [
            "Monitor cooling system",
            "Check fuel quality",
            "Clean air intake",
        ],
        (AssetType::Generator, Season::Wet) => [
            "Protect from moisture",
            "Check electrical connections",
            "Monitor exhaust system",
        ],
        (AssetType::Generator, Season::Harmattan) => [
            "Change air filter frequently",
            "Check voltage regulator",
            "Clean cooling fins",
        ],
        (AssetType::Appliance, Season::Dry) => [
            "Clean refrigerator coils",
            "Check AC refrigerant",
            "Monitor power consumption",
        ],
        (AssetType::Appliance, Season::Wet) => [
            "Check for moisture damage",
            "Inspect electrical connections",
            "Clean drainage systems",
        ],
        (AssetType::Appliance, Season::Harmattan) => [
            "Replace air filters",
            "Clean fan blades",
            "Check seals and gaskets",
        ],
        (AssetType::Car | AssetType::Other, Season::Dry) => [
            "Check tire pressure frequently",
            "Monitor engine cooling system",
            "Clean air filter monthly",
        ],
        (AssetType::Car | AssetType::Other, Season::Wet) => [
            "Check brake performance",
            "Inspect windshield wipers",
            "Monitor battery terminals",
        ],
        (AssetType::Car | AssetType::Other, Season::Harmattan) => [
            "Replace cabin air filter",
            "Check AC system",
            "Protect paint from dust",
        ],
    };
    tips.to_vec()
}
