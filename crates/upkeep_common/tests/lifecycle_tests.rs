//! Recommendation lifecycle tests: transitions, active views, batch merge.

use chrono::{DateTime, Duration, TimeZone, Utc};
use upkeep_common::generator::fallback;
use upkeep_common::{
    ActiveFilter, ActiveOrder, AssetDescriptor, AssetType, Category, EngineError, Priority,
    Recommendation, RecommendationLifecycle, RecommendationStatus,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 1, 8, 0, 0).unwrap()
}

fn rec(id: &str, asset_id: &str, priority: Priority, created_at: DateTime<Utc>) -> Recommendation {
    Recommendation {
        id: id.to_string(),
        asset_id: asset_id.to_string(),
        title: format!("Task {}", id),
        description: String::new(),
        priority,
        category: Category::Routine,
        estimated_cost: None,
        timeframe: "This month".to_string(),
        status: RecommendationStatus::Pending,
        created_at,
    }
}

fn seeded() -> RecommendationLifecycle {
    let mut lifecycle = RecommendationLifecycle::in_memory();
    lifecycle.merge_batch(
        "a1",
        vec![
            rec("r1", "a1", Priority::Low, t0()),
            rec("r2", "a1", Priority::High, t0() + Duration::minutes(2)),
            rec("r3", "a1", Priority::Medium, t0()),
        ],
    );
    lifecycle.merge_batch(
        "a2",
        vec![rec("r4", "a2", Priority::High, t0() + Duration::minutes(1))],
    );
    lifecycle
}

fn ids(recs: &[Recommendation]) -> Vec<&str> {
    recs.iter().map(|r| r.id.as_str()).collect()
}

// ============================================================================
// Transitions
// ============================================================================

#[test]
fn test_mark_completed_is_idempotent() {
    let mut lifecycle = seeded();

    let first = lifecycle.mark_completed("r1").unwrap();
    assert_eq!(first.status, RecommendationStatus::Completed);

    let second = lifecycle.mark_completed("r1").unwrap();
    assert_eq!(second, first);
}

#[test]
fn test_dismiss_is_idempotent() {
    let mut lifecycle = seeded();

    let first = lifecycle.dismiss("r2").unwrap();
    let second = lifecycle.dismiss("r2").unwrap();
    assert_eq!(first.status, RecommendationStatus::Dismissed);
    assert_eq!(second, first);
}

#[test]
fn test_terminal_states_do_not_cross() {
    let mut lifecycle = seeded();
    lifecycle.mark_completed("r1").unwrap();
    lifecycle.dismiss("r2").unwrap();

    assert!(matches!(lifecycle.dismiss("r1"), Err(EngineError::Validation(_))));
    assert!(matches!(lifecycle.mark_completed("r2"), Err(EngineError::Validation(_))));
    assert!(matches!(
        lifecycle.set_status("r3", RecommendationStatus::Pending),
        Err(EngineError::Validation(_))
    ));

    assert_eq!(lifecycle.get("r1").unwrap().status, RecommendationStatus::Completed);
    assert_eq!(lifecycle.get("r2").unwrap().status, RecommendationStatus::Dismissed);
}

#[test]
fn test_unknown_id_is_not_found() {
    let mut lifecycle = seeded();
    let err = lifecycle.mark_completed("nope").unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
    assert!(lifecycle.dismiss("nope").is_err());
}

// ============================================================================
// Active view
// ============================================================================

#[test]
fn test_list_active_insertion_order() {
    let mut lifecycle = seeded();
    lifecycle.dismiss("r3").unwrap();

    let active = lifecycle.list_active(&ActiveFilter::default(), ActiveOrder::Insertion);
    assert_eq!(ids(&active), vec!["r1", "r2", "r4"]);
}

#[test]
fn test_list_active_priority_order_ties_by_created_at() {
    let lifecycle = seeded();
    let active = lifecycle.list_active(&ActiveFilter::default(), ActiveOrder::Priority);
    // r4 and r2 are both HIGH; r4 was created first
    assert_eq!(ids(&active), vec!["r4", "r2", "r3", "r1"]);
}

#[test]
fn test_list_active_filters() {
    let lifecycle = seeded();

    let high = ActiveFilter {
        priority: Some(Priority::High),
        asset_id: None,
    };
    assert_eq!(ids(&lifecycle.list_active(&high, ActiveOrder::Insertion)), vec!["r2", "r4"]);

    let a1_high = ActiveFilter {
        priority: Some(Priority::High),
        asset_id: Some("a1".to_string()),
    };
    assert_eq!(ids(&lifecycle.list_active(&a1_high, ActiveOrder::Insertion)), vec!["r2"]);
}

#[test]
fn test_history_keeps_resolved_records() {
    let mut lifecycle = seeded();
    lifecycle.mark_completed("r1").unwrap();
    lifecycle.dismiss("r4").unwrap();

    assert_eq!(lifecycle.history(None).len(), 4);
    assert_eq!(ids(&lifecycle.history(Some("a2"))), vec!["r4"]);
    assert!(!lifecycle
        .list_active(&ActiveFilter::default(), ActiveOrder::Insertion)
        .iter()
        .any(|r| r.id == "r1" || r.id == "r4"));
}

// ============================================================================
// Merge
// ============================================================================

#[test]
fn test_merge_replaces_pending_for_asset_only() {
    let mut lifecycle = seeded();
    lifecycle.mark_completed("r1").unwrap();

    let report = lifecycle
        .merge_batch(
            "a1",
            vec![
                rec("n1", "a1", Priority::Low, t0()),
                rec("n2", "a1", Priority::Low, t0()),
            ],
        )
        .report;
    assert_eq!(report.replaced, 2); // r2, r3
    assert_eq!(report.added, 2);
    assert_eq!(report.skipped, 0);

    let all = lifecycle.history(None);
    assert_eq!(ids(&all), vec!["r1", "r4", "n1", "n2"]);
}

#[test]
fn test_merge_never_overwrites_history() {
    let asset = AssetDescriptor::new("a1", AssetType::Generator);
    let mut lifecycle = RecommendationLifecycle::in_memory();

    lifecycle.merge_batch("a1", fallback::recommendations_for(&asset, t0()));
    lifecycle.dismiss("rule-a1-0").unwrap();

    // Regenerating yields the same positional ids
    let outcome = lifecycle.merge_batch("a1", fallback::recommendations_for(&asset, t0()));
    let report = outcome.report;
    assert_eq!(report.replaced, 1);
    assert_eq!(report.added, 1);
    assert_eq!(report.skipped, 1);

    assert_eq!(
        lifecycle.get("rule-a1-0").unwrap().status,
        RecommendationStatus::Dismissed
    );
    let active = lifecycle.list_active(&ActiveFilter::default(), ActiveOrder::Insertion);
    assert_eq!(ids(&active), vec!["rule-a1-1"]);
    assert_eq!(ids(&outcome.stored), ids(&active));
}

#[test]
fn test_merge_stores_new_need_under_free_id() {
    let mut lifecycle = RecommendationLifecycle::in_memory();
    let mut brakes = rec("ai-a1-0", "a1", Priority::High, t0());
    brakes.title = "Check brake pads".to_string();
    lifecycle.merge_batch("a1", vec![brakes]);
    lifecycle.mark_completed("ai-a1-0").unwrap();

    // Same position, different need
    let mut filter = rec("ai-a1-0", "a1", Priority::Medium, t0() + Duration::days(1));
    filter.title = "Replace air filter".to_string();
    let outcome = lifecycle.merge_batch("a1", vec![filter]);
    assert_eq!(outcome.report.added, 1);
    assert_eq!(outcome.report.skipped, 0);
    assert_eq!(ids(&outcome.stored), vec!["ai-a1-0-1"]);

    let completed = lifecycle.get("ai-a1-0").unwrap();
    assert_eq!(completed.title, "Check brake pads");
    assert_eq!(completed.status, RecommendationStatus::Completed);

    let active = lifecycle.list_active(&ActiveFilter::default(), ActiveOrder::Insertion);
    assert_eq!(active, outcome.stored);
    assert_eq!(active[0].title, "Replace air filter");

    // The renamed record is history too once completed; the same need is not re-added
    lifecycle.mark_completed("ai-a1-0-1").unwrap();
    let mut again = rec("ai-a1-0", "a1", Priority::Medium, t0() + Duration::days(2));
    again.title = " replace AIR filter ".to_string();
    let outcome = lifecycle.merge_batch("a1", vec![again]);
    assert_eq!(outcome.report.skipped, 1);
    assert!(outcome.stored.is_empty());
}
