//! Prometheus metrics for the recommendation and reminder engine

use prometheus::{
    register_int_counter_vec_with_registry, Encoder, IntCounterVec, Registry, TextEncoder,
};
use std::sync::Arc;
use upkeep_common::{FallbackReason, RecommendationSource, RecommendationStatus};

/// Engine metrics, registered on a private registry
#[derive(Clone)]
pub struct EngineMetrics {
    /// Recommendations produced, by source (provider | fallback)
    pub recommendations_generated_total: IntCounterVec,
    /// Provider fallbacks, by reason
    pub provider_fallbacks_total: IntCounterVec,
    /// Reminder mutations, by action
    pub reminder_transitions_total: IntCounterVec,
    /// Recommendation status changes, by target status
    pub recommendation_transitions_total: IntCounterVec,

    registry: Arc<Registry>,
}

impl EngineMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let recommendations_generated_total = register_int_counter_vec_with_registry!(
            "upkeep_recommendations_generated_total",
            "Total number of recommendations generated by source",
            &["source"],
            registry
        )?;

        let provider_fallbacks_total = register_int_counter_vec_with_registry!(
            "upkeep_provider_fallbacks_total",
            "Total number of generation requests served by the rule table, by reason",
            &["reason"],
            registry
        )?;

        let reminder_transitions_total = register_int_counter_vec_with_registry!(
            "upkeep_reminder_transitions_total",
            "Total number of reminder mutations by action",
            &["action"],
            registry
        )?;

        let recommendation_transitions_total = register_int_counter_vec_with_registry!(
            "upkeep_recommendation_transitions_total",
            "Total number of recommendation status changes by status",
            &["status"],
            registry
        )?;

        Ok(Self {
            recommendations_generated_total,
            provider_fallbacks_total,
            reminder_transitions_total,
            recommendation_transitions_total,
            registry: Arc::new(registry),
        })
    }

    /// Record a generated batch
    pub fn record_generation(&self, source: &RecommendationSource, count: usize) {
        self.recommendations_generated_total
            .with_label_values(&[source.label()])
            .inc_by(count as u64);
        if let RecommendationSource::Fallback { reason } = source {
            self.record_fallback(reason);
        }
    }

    pub fn record_fallback(&self, reason: &FallbackReason) {
        self.provider_fallbacks_total
            .with_label_values(&[reason.label()])
            .inc();
    }

    /// Record a reminder action (create, complete, snooze, edit, remove)
    pub fn record_reminder(&self, action: &str) {
        self.reminder_transitions_total
            .with_label_values(&[action])
            .inc();
    }

    pub fn record_recommendation(&self, status: RecommendationStatus) {
        self.recommendation_transitions_total
            .with_label_values(&[status.as_str()])
            .inc();
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = EngineMetrics::new().unwrap();
        metrics.record_reminder("create");
        let export = metrics.export().unwrap();
        assert!(export.contains("upkeep_reminder_transitions_total"));
    }

    #[test]
    fn test_record_generation_fallback() {
        let metrics = EngineMetrics::new().unwrap();
        metrics.record_generation(
            &RecommendationSource::Fallback {
                reason: FallbackReason::Timeout,
            },
            3,
        );

        assert_eq!(
            metrics
                .recommendations_generated_total
                .with_label_values(&["fallback"])
                .get(),
            3
        );
        assert_eq!(
            metrics
                .provider_fallbacks_total
                .with_label_values(&["timeout"])
                .get(),
            1
        );
    }

    #[test]
    fn test_record_generation_provider() {
        let metrics = EngineMetrics::new().unwrap();
        metrics.record_generation(&RecommendationSource::Provider, 4);
        metrics.record_recommendation(RecommendationStatus::Dismissed);

        let export = metrics.export().unwrap();
        assert!(export.contains(r#"upkeep_recommendations_generated_total{source="provider"} 4"#));
        assert!(export.contains(r#"upkeep_recommendation_transitions_total{status="DISMISSED"} 1"#));
    }
}
