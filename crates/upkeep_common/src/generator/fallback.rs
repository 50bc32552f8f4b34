//! Deterministic offline recommendation table.
//!
//! One canonical template set per asset type. OTHER (and therefore any
//! unknown type) uses the CAR set.

use crate::asset::{AssetDescriptor, AssetType};
use crate::recommendation::{Category, Priority, Recommendation, RecommendationStatus};
use chrono::{DateTime, Utc};

/// A fixed recommendation, before it is bound to an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub title: &'static str,
    pub description: &'static str,
    pub priority: Priority,
    pub category: Category,
    pub estimated_cost: &'static str,
    pub timeframe: &'static str,
}

const CAR: &[Template] = &[
    Template {
        title: "Check Brake System",
        description: "Lagos traffic increases brake wear. Inspect brake pads and fluid levels due to frequent stop-and-go driving.",
        priority: Priority::High,
        category: Category::Urgent,
        estimated_cost: "₦15,000 - ₦25,000",
        timeframe: "Within 2 weeks",
    },
    Template {
        title: "Service Air Conditioning",
        description: "Pre-dry season AC service. Clean filters and check refrigerant levels before harmattan peak.",
        priority: Priority::Medium,
        category: Category::Seasonal,
        estimated_cost: "₦8,000 - ₦12,000",
        timeframe: "Next month",
    },
    Template {
        title: "Tire Rotation & Pressure",
        description: "Rotate tires every 10,000km. Check pressure weekly due to temperature variations.",
        priority: Priority::Low,
        category: Category::Routine,
        estimated_cost: "₦2,000 - ₦5,000",
        timeframe: "Next service",
    },
];

const GENERATOR: &[Template] = &[
    Template {
        title: "Clean Fuel System",
        description: "Nigerian fuel quality varies. Clean fuel injectors and replace fuel filter to prevent clogging.",
        priority: Priority::High,
        category: Category::Urgent,
        estimated_cost: "₦20,000 - ₦35,000",
        timeframe: "Within 1 week",
    },
    Template {
        title: "Check Voltage Regulator",
        description: "Power grid fluctuations stress voltage regulators. Test and calibrate during harmattan season.",
        priority: Priority::Medium,
        category: Category::Preventive,
        estimated_cost: "₦10,000 - ₦18,000",
        timeframe: "This month",
    },
];

const APPLIANCE: &[Template] = &[Template {
    title: "Clean Refrigerator Coils",
    description: "Dust buildup reduces efficiency by 25%. Clean coils monthly during harmattan season.",
    priority: Priority::Medium,
    category: Category::Routine,
    estimated_cost: "₦1,000 - ₦3,000",
    timeframe: "This week",
}];

/// Template set for an asset type
pub fn templates_for(asset_type: AssetType) -> &'static [Template] {
    match asset_type {
        AssetType::Generator => GENERATOR,
        AssetType::Appliance => APPLIANCE,
        AssetType::Car | AssetType::Other => CAR,
    }
}

/// Bind the asset's template set to the asset. Ids are `rule-{assetId}-{index}`.
pub fn recommendations_for(asset: &AssetDescriptor, now: DateTime<Utc>) -> Vec<Recommendation> {
    templates_for(asset.asset_type)
        .iter()
        .enumerate()
        .map(|(index, t)| Recommendation {
            id: format!("rule-{}-{}", asset.id, index),
            asset_id: asset.id.clone(),
            title: t.title.to_string(),
            description: t.description.to_string(),
            priority: t.priority,
            category: t.category,
            estimated_cost: Some(t.estimated_cost.to_string()),
            timeframe: t.timeframe.to_string(),
            status: RecommendationStatus::Pending,
            created_at: now,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_every_type_has_templates() {
        for asset_type in AssetType::ALL {
            assert!(!templates_for(asset_type).is_empty(), "{} has no templates", asset_type);
        }
    }

    #[test]
    fn test_other_uses_car_set() {
        assert_eq!(templates_for(AssetType::Other), templates_for(AssetType::Car));
    }

    #[test]
    fn test_table_sizes() {
        assert_eq!(templates_for(AssetType::Car).len(), 3);
        assert_eq!(templates_for(AssetType::Generator).len(), 2);
        assert_eq!(templates_for(AssetType::Appliance).len(), 1);
    }

    #[test]
    fn test_descriptions_keep_regional_detail() {
        let car = templates_for(AssetType::Car);
        assert!(car[0].description.starts_with("Lagos traffic increases brake wear."));
        let generator = templates_for(AssetType::Generator);
        assert!(generator[0].description.starts_with("Nigerian fuel quality varies."));
        assert!(templates_for(AssetType::Appliance)[0]
            .description
            .contains("harmattan season"));
    }

    #[test]
    fn test_recommendations_bound_to_asset() {
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap();
        let asset = AssetDescriptor::new("gen-7", AssetType::Generator);
        let recs = recommendations_for(&asset, now);

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].id, "rule-gen-7-0");
        assert_eq!(recs[1].id, "rule-gen-7-1");
        assert!(recs.iter().all(|r| r.asset_id == "gen-7"));
        assert!(recs.iter().all(|r| r.status == RecommendationStatus::Pending));
        assert!(recs.iter().all(|r| r.created_at == now));
        assert_eq!(recs[0].title, "Clean Fuel System");
    }
}
