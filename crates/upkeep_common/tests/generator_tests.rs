//! Recommendation generator tests.
//!
//! Provider behaviour is scripted with `FakeLlmClient`; nothing here touches
//! the network.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use upkeep_common::generator::fallback;
use upkeep_common::{
    AssetDescriptor, AssetType, Category, FakeLlmClient, FallbackReason, GeneratorConfig, LlmClient,
    LlmError, Priority, RecommendationGenerator, RecommendationSource, RecommendationStatus,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 15, 9, 30, 0).unwrap()
}

fn hilux() -> AssetDescriptor {
    AssetDescriptor::new("asset-1", AssetType::Car)
        .with_name("Toyota Hilux")
        .with_brand_model("Toyota", "Hilux")
}

fn generator_with(client: FakeLlmClient) -> (RecommendationGenerator, Arc<FakeLlmClient>) {
    let fake = Arc::new(client);
    let dyn_client: Arc<dyn LlmClient> = fake.clone();
    let generator = RecommendationGenerator::new(Some(dyn_client), GeneratorConfig::default());
    (generator, fake)
}

const PROVIDER_REPLY: &str = r#"Sure! Here are the recommendations:
```json
[
  {
    "title": "Replace air filter",
    "description": "Harmattan dust clogs the intake.",
    "priority": "HIGH",
    "estimatedCost": "₦6,000 - ₦9,000",
    "timeframe": "Within 1 week",
    "category": "SEASONAL"
  },
  {
    "title": "Check coolant",
    "description": "High ambient heat.",
    "priority": "urgent-ish",
    "timeframe": "This month",
    "category": "whatever"
  },
  {
    "title": "Inspect battery terminals",
    "priority": "LOW",
    "category": "ROUTINE"
  }
]
```"#;

// ============================================================================
// Provider path
// ============================================================================

#[tokio::test]
async fn test_provider_reply_is_parsed_and_coerced() {
    let (generator, fake) = generator_with(FakeLlmClient::always_text(PROVIDER_REPLY));
    let outcome = generator.generate(&hilux(), now()).await;

    assert_eq!(outcome.source, RecommendationSource::Provider);
    assert_eq!(fake.call_count(), 1);

    let recs = &outcome.recommendations;
    assert_eq!(recs.len(), 3);
    assert_eq!(recs[0].id, "ai-asset-1-0");
    assert_eq!(recs[2].id, "ai-asset-1-2");
    assert_eq!(recs[0].priority, Priority::High);
    assert_eq!(recs[0].category, Category::Seasonal);
    assert_eq!(recs[0].estimated_cost.as_deref(), Some("₦6,000 - ₦9,000"));

    // Unrecognised enum text coerced to safe defaults
    assert_eq!(recs[1].priority, Priority::Medium);
    assert_eq!(recs[1].category, Category::Routine);
    assert!(recs[1].estimated_cost.is_none());

    // Missing description/timeframe filled in
    assert_eq!(recs[2].description, "");
    assert_eq!(recs[2].timeframe, "As soon as practical");

    for rec in recs {
        assert_eq!(rec.asset_id, "asset-1");
        assert_eq!(rec.status, RecommendationStatus::Pending);
        assert_eq!(rec.created_at, now());
    }
}

#[tokio::test]
async fn test_provider_output_truncated_to_max_items() {
    let items: Vec<String> = (0..7)
        .map(|i| format!(r#"{{"title": "Task {}", "priority": "LOW"}}"#, i))
        .collect();
    let reply = format!("[{}]", items.join(","));

    let (generator, _) = generator_with(FakeLlmClient::always_text(reply));
    let outcome = generator.generate(&hilux(), now()).await;

    assert_eq!(outcome.source, RecommendationSource::Provider);
    assert_eq!(outcome.recommendations.len(), 4);
    assert_eq!(outcome.recommendations[3].title, "Task 3");
}

#[tokio::test]
async fn test_regeneration_is_idempotent_by_position() {
    let (generator, _) = generator_with(FakeLlmClient::always_text(PROVIDER_REPLY));
    let first = generator.generate(&hilux(), now()).await;
    let second = generator.generate(&hilux(), now()).await;

    let ids = |o: &upkeep_common::GenerationOutcome| {
        o.recommendations.iter().map(|r| r.id.clone()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
}

// ============================================================================
// Fallback path
// ============================================================================

#[tokio::test]
async fn test_provider_error_yields_exact_fallback_table() {
    let failures = vec![
        LlmError::HttpError("HTTP 429 Too Many Requests".to_string()),
        LlmError::Timeout(15),
        LlmError::EmptyResponse,
        LlmError::InvalidJson("eof".to_string()),
        LlmError::Disabled,
    ];

    for error in failures {
        for asset_type in AssetType::ALL {
            let asset = AssetDescriptor::new("a-9", asset_type);
            let (generator, _) = generator_with(FakeLlmClient::always_error(error.clone()));
            let outcome = generator.generate(&asset, now()).await;

            assert!(outcome.source.is_fallback(), "{:?} should fall back", error);
            assert_eq!(outcome.recommendations, fallback::recommendations_for(&asset, now()));
        }
    }
}

#[tokio::test]
async fn test_unparseable_reply_yields_fallback() {
    let replies = [
        "I'm sorry, I can't help with that.",
        "[{\"title\": \"broken\",",
        "[1, 2, 3]",
        "[{\"description\": \"no titles anywhere\"}]",
    ];

    for reply in replies {
        let (generator, _) = generator_with(FakeLlmClient::always_text(reply));
        let outcome = generator.generate(&hilux(), now()).await;

        match &outcome.source {
            RecommendationSource::Fallback {
                reason: FallbackReason::Parse(_),
            } => {}
            other => panic!("expected parse fallback for {:?}, got {:?}", reply, other),
        }
        assert_eq!(outcome.recommendations, fallback::recommendations_for(&hilux(), now()));
    }
}

#[tokio::test]
async fn test_slow_provider_times_out_to_fallback() {
    let (generator, _) = generator_with(
        FakeLlmClient::always_text(PROVIDER_REPLY).with_delay(Duration::from_millis(500)),
    );
    let generator = generator.with_timeout(Duration::from_millis(20));
    let outcome = generator.generate(&hilux(), now()).await;

    assert_eq!(
        outcome.source,
        RecommendationSource::Fallback {
            reason: FallbackReason::Timeout
        }
    );
    assert_eq!(outcome.recommendations.len(), 3);
    assert_eq!(outcome.recommendations[0].id, "rule-asset-1-0");
}

#[tokio::test]
async fn test_offline_generator_never_calls_out() {
    let generator = RecommendationGenerator::offline();
    assert!(!generator.has_provider());

    let outcome = generator.generate(&hilux(), now()).await;
    assert_eq!(
        outcome.source,
        RecommendationSource::Fallback {
            reason: FallbackReason::NoProvider
        }
    );
}

#[tokio::test]
async fn test_non_empty_for_every_asset_type() {
    let generator = RecommendationGenerator::offline();
    for asset_type in AssetType::ALL {
        let asset = AssetDescriptor::new(format!("id-{}", asset_type.label()), asset_type);
        let outcome = generator.generate(&asset, now()).await;

        assert!(!outcome.recommendations.is_empty());
        assert!(outcome.recommendations.iter().all(|r| r.asset_id == asset.id));
    }
}

#[tokio::test]
async fn test_unknown_type_uses_car_table() {
    let asset_type = AssetType::parse_lenient("BOAT");
    assert_eq!(asset_type, AssetType::Other);

    let generator = RecommendationGenerator::offline();
    let boat = generator
        .generate(&AssetDescriptor::new("b1", asset_type), now())
        .await;
    let car = generator
        .generate(&AssetDescriptor::new("b1", AssetType::Car), now())
        .await;

    assert_eq!(boat.recommendations, car.recommendations);
}
