//! Recommendation Lifecycle Manager.
//!
//! Tracks PENDING -> COMPLETED / DISMISSED transitions, serves the active
//! view and merges freshly generated batches into the stored set.

use crate::error::{EngineError, EngineResult};
use crate::filter::sort_by_priority;
use crate::recommendation::{Priority, Recommendation, RecommendationStatus};
use crate::repository::{MemoryRepository, Repository};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Optional narrowing of the active view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFilter {
    pub priority: Option<Priority>,
    pub asset_id: Option<String>,
}

/// Ordering of the active view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveOrder {
    /// Stable insertion order
    #[default]
    Insertion,
    /// HIGH first, ties broken by `createdAt` ascending
    Priority,
}

/// Result of merging a generated batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    /// PENDING records removed for the asset
    pub replaced: usize,
    /// New records stored
    pub added: usize,
    /// Batch items already present in history under the same title
    pub skipped: usize,
}

/// What `merge_batch` did, plus the records it actually stored
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub report: MergeReport,
    pub stored: Vec<Recommendation>,
}

pub struct RecommendationLifecycle<R = MemoryRepository<Recommendation>> {
    repo: R,
}

impl RecommendationLifecycle<MemoryRepository<Recommendation>> {
    pub fn in_memory() -> Self {
        Self::new(MemoryRepository::new())
    }
}

impl<R: Repository<Recommendation>> RecommendationLifecycle<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn get(&self, id: &str) -> EngineResult<Recommendation> {
        self.repo
            .get(id)
            .ok_or_else(|| EngineError::not_found("Recommendation", id))
    }

    pub fn mark_completed(&mut self, id: &str) -> EngineResult<Recommendation> {
        self.set_status(id, RecommendationStatus::Completed)
    }

    pub fn dismiss(&mut self, id: &str) -> EngineResult<Recommendation> {
        self.set_status(id, RecommendationStatus::Dismissed)
    }

    /// Apply a terminal status. Re-applying the current status is a no-op.
    pub fn set_status(
        &mut self,
        id: &str,
        status: RecommendationStatus,
    ) -> EngineResult<Recommendation> {
        let mut rec = self.get(id)?;
        if rec.transition(status)? {
            self.repo.upsert(rec.clone());
            info!("Recommendation {} -> {}", id, status);
        } else {
            debug!("Recommendation {} already {}", id, status);
        }
        Ok(rec)
    }

    /// PENDING recommendations, optionally narrowed and reordered
    pub fn list_active(&self, filter: &ActiveFilter, order: ActiveOrder) -> Vec<Recommendation> {
        let mut active: Vec<Recommendation> = self
            .repo
            .list()
            .into_iter()
            .filter(|r| r.is_active())
            .filter(|r| filter.priority.map_or(true, |p| r.priority == p))
            .filter(|r| filter.asset_id.as_deref().map_or(true, |a| r.asset_id == a))
            .collect();

        if order == ActiveOrder::Priority {
            sort_by_priority(&mut active);
        }
        active
    }

    /// Every record regardless of status, optionally for one asset
    pub fn history(&self, asset_id: Option<&str>) -> Vec<Recommendation> {
        self.repo
            .list()
            .into_iter()
            .filter(|r| asset_id.map_or(true, |a| r.asset_id == a))
            .collect()
    }

    /// Replace the asset's PENDING recommendations with `batch`.
    ///
    /// Completed and dismissed records are history and are never overwritten.
    /// A batch item whose id names one is dropped when it carries the same
    /// title; otherwise it is stored under the first free `{id}-{n}`.
    pub fn merge_batch(&mut self, asset_id: &str, batch: Vec<Recommendation>) -> MergeOutcome {
        let mut report = MergeReport::default();
        let mut stored = Vec::with_capacity(batch.len());

        let stale: Vec<String> = self
            .repo
            .list()
            .into_iter()
            .filter(|r| r.asset_id == asset_id && r.is_active())
            .map(|r| r.id)
            .collect();
        for id in stale {
            self.repo.delete(&id);
            report.replaced += 1;
        }

        for mut rec in batch {
            match self.free_id(&rec) {
                Some(id) => {
                    if id != rec.id {
                        debug!("Recommendation id {} is history, storing as {}", rec.id, id);
                        rec.id = id;
                    }
                    self.repo.upsert(rec.clone());
                    stored.push(rec);
                    report.added += 1;
                }
                None => {
                    debug!("Skipping {}: already in history", rec.id);
                    report.skipped += 1;
                }
            }
        }

        info!(
            "Merged recommendations for {}: {} replaced, {} added, {} skipped",
            asset_id, report.replaced, report.added, report.skipped
        );
        MergeOutcome { report, stored }
    }

    /// First id in `id`, `id-1`, `id-2`, ... not taken by the repository.
    /// `None` when a record on the way already has the same title.
    fn free_id(&self, rec: &Recommendation) -> Option<String> {
        let mut candidate = rec.id.clone();
        let mut n = 0;
        while let Some(existing) = self.repo.get(&candidate) {
            if same_title(&existing.title, &rec.title) {
                return None;
            }
            n += 1;
            candidate = format!("{}-{}", rec.id, n);
        }
        Some(candidate)
    }
}

fn same_title(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
