//! HTTP API payloads shared by `upkeepd` and `upkeepctl`.

use crate::asset::AssetDescriptor;
use crate::generator::RecommendationSource;
use crate::lifecycle::MergeReport;
use crate::providers::ServiceProvider;
use crate::recommendation::Recommendation;
use crate::reminder::{DueStatus, Reminder, ReminderState};
use crate::seasonal::Season;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub use crate::scheduler::ReminderSummary;

/// Error body returned for every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Reminder enriched for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderView {
    #[serde(flatten)]
    pub reminder: Reminder,
    pub asset: Option<AssetDescriptor>,
    pub due_status: DueStatus,
    pub state: ReminderState,
}

impl ReminderView {
    pub fn new(
        reminder: Reminder,
        asset: Option<AssetDescriptor>,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Self {
        Self {
            due_status: reminder.due_status(now, window),
            state: reminder.state(now),
            asset,
            reminder,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemindersResponse {
    pub reminders: Vec<ReminderView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetsResponse {
    pub assets: Vec<AssetDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
}

/// `POST /v1/recommendations/generate`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub asset_id: Option<String>,
    /// Set for an ad-hoc asset not in the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Records stored as PENDING by this call, under their final ids
    pub recommendations: Vec<Recommendation>,
    pub source: RecommendationSource,
    pub merge: MergeReport,
}

/// `PUT /v1/recommendations`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub recommendation_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// `POST /v1/reminders/{id}/snooze`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnoozeRequest {
    #[serde(default)]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalAdviceResponse {
    pub asset_type: String,
    pub season: Season,
    pub advice: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ServiceProvider>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub enabled: bool,
    pub backend: String,
    pub model: String,
}

/// `GET /v1/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub provider: ProviderInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetType;
    use crate::recommendation::Priority;
    use crate::reminder::Frequency;
    use chrono::TimeZone;

    fn reminder(next_due: DateTime<Utc>) -> Reminder {
        let created = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        Reminder {
            id: "r1".to_string(),
            asset_id: "asset-1".to_string(),
            title: "Change Engine Oil".to_string(),
            description: None,
            priority: Priority::Medium,
            frequency: Frequency::Monthly,
            next_due,
            is_active: true,
            completed_at: None,
            snoozed_until: None,
            recurring: true,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_reminder_view_flattens() {
        let now = Utc.with_ymd_and_hms(2025, 7, 10, 0, 0, 0).unwrap();
        let view = ReminderView::new(
            reminder(now - Duration::days(1)),
            Some(AssetDescriptor::new("asset-1", AssetType::Car)),
            now,
            Duration::days(7),
        );
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], "r1");
        assert_eq!(json["assetId"], "asset-1");
        assert_eq!(json["dueStatus"], "OVERDUE");
        assert_eq!(json["state"], "ACTIVE");
        assert_eq!(json["asset"]["type"], "CAR");

        let back: ReminderView = serde_json::from_value(json).unwrap();
        assert_eq!(back, view);
    }

    #[test]
    fn test_reminder_view_without_asset() {
        let now = Utc.with_ymd_and_hms(2025, 7, 10, 0, 0, 0).unwrap();
        let view = ReminderView::new(reminder(now + Duration::days(3)), None, now, Duration::days(7));
        let json = serde_json::to_value(&view).unwrap();
        assert!(json["asset"].is_null());
        assert_eq!(json["dueStatus"], "UPCOMING");
    }

    #[test]
    fn test_generate_request_shapes() {
        let req: GenerateRequest = serde_json::from_str(r#"{"assetId": "asset-1"}"#).unwrap();
        assert_eq!(req.asset_id.as_deref(), Some("asset-1"));
        assert!(req.asset_type.is_none());

        let req: GenerateRequest =
            serde_json::from_str(r#"{"assetId": "x", "assetType": "BOAT"}"#).unwrap();
        assert_eq!(req.asset_type.as_deref(), Some("BOAT"));
    }
}
