//! Demo data loaded at startup when `server.seed_demo_data` is set.

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::info;
use upkeep_common::generator::fallback;
use upkeep_common::{
    AssetCatalog, AssetDescriptor, AssetType, EngineResult, MemoryAssetCatalog, NewReminder,
    RecommendationLifecycle, ReminderScheduler,
};

fn demo_assets() -> Vec<AssetDescriptor> {
    let mut assets = vec![
        AssetDescriptor::new("asset-1", AssetType::Car)
            .with_name("Toyota Hilux")
            .with_brand_model("Toyota", "Hilux"),
        AssetDescriptor::new("asset-2", AssetType::Generator)
            .with_name("Perkins Generator")
            .with_brand_model("Perkins", "1104A-44"),
    ];
    if let Some(date) = Utc.with_ymd_and_hms(2021, 3, 15, 0, 0, 0).single() {
        assets[0].purchase_date = Some(date);
    }
    assets
}

fn demo_reminder(
    title: &str,
    description: &str,
    asset_id: &str,
    priority: &str,
    frequency: &str,
    next_due: DateTime<Utc>,
) -> NewReminder {
    NewReminder {
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        asset_id: Some(asset_id.to_string()),
        priority: Some(priority.to_string()),
        frequency: Some(frequency.to_string()),
        next_due: Some(next_due.to_rfc3339()),
        recurring: None,
    }
}

/// Populate empty collections with the demo assets, reminders and the
/// rule-table recommendations for the first asset. Due dates are relative
/// to `now`.
pub fn seed_demo_data(
    assets: &mut MemoryAssetCatalog,
    reminders: &mut ReminderScheduler,
    recommendations: &mut RecommendationLifecycle,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    for asset in demo_assets() {
        assets.insert(asset);
    }

    reminders.create(
        demo_reminder(
            "Change Engine Oil",
            "Regular maintenance for Toyota Hilux",
            "asset-1",
            "MEDIUM",
            "MONTHLY",
            now + Duration::days(10),
        ),
        &*assets,
        now,
    )?;
    reminders.create(
        demo_reminder(
            "Generator Fuel Check",
            "Check and replace fuel filter",
            "asset-2",
            "HIGH",
            "WEEKLY",
            now + Duration::days(2),
        ),
        &*assets,
        now,
    )?;

    if let Some(hilux) = assets.get("asset-1") {
        recommendations.merge_batch(&hilux.id, fallback::recommendations_for(&hilux, now));
    }

    info!(
        "  Seeded demo data: {} assets, {} reminders",
        assets.len(),
        reminders.list().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use upkeep_common::{ActiveFilter, ActiveOrder, ReminderFilter};

    #[test]
    fn test_seed_demo_data() {
        let mut assets = MemoryAssetCatalog::new();
        let mut reminders = ReminderScheduler::in_memory();
        let mut recs = RecommendationLifecycle::in_memory();
        let now = Utc::now();

        seed_demo_data(&mut assets, &mut reminders, &mut recs, now).unwrap();

        assert_eq!(assets.len(), 2);
        assert_eq!(assets.get("asset-2").unwrap().model.as_deref(), Some("1104A-44"));
        assert_eq!(reminders.list().len(), 2);

        // The generator fuel check is due within the week
        let upcoming = reminders.filtered(ReminderFilter::Upcoming, now);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].title, "Generator Fuel Check");

        let active = recs.list_active(&ActiveFilter::default(), ActiveOrder::Insertion);
        assert_eq!(active.len(), 3);
        assert!(active.iter().all(|r| r.asset_id == "asset-1"));
    }
}
