//! Upkeep Common - maintenance recommendation and reminder engine.
//!
//! Shared by the daemon (`upkeepd`) and the CLI (`upkeepctl`).
//! Every function that depends on the current time takes `now` explicitly.

pub mod api;
pub mod asset;
pub mod config;
pub mod error;
pub mod filter;
pub mod generator;
pub mod helpers;
pub mod lifecycle;
pub mod llm_client;
pub mod providers;
pub mod recommendation;
pub mod reminder;
pub mod repository;
pub mod scheduler;
pub mod seasonal;

pub use asset::{AssetCatalog, AssetDescriptor, AssetType, MemoryAssetCatalog, NewAsset};
pub use config::UpkeepConfig;
pub use error::{EngineError, EngineResult};
pub use filter::{filter_recommendations, filter_reminders, PriorityFilter, ReminderFilter};
pub use generator::{
    FallbackReason, GenerationOutcome, GeneratorConfig, RecommendationGenerator, RecommendationSource,
};
pub use lifecycle::{ActiveFilter, ActiveOrder, MergeOutcome, MergeReport, RecommendationLifecycle};
pub use llm_client::{FakeLlmClient, HttpLlmClient, LlmBackend, LlmClient, LlmConfig, LlmError};
pub use providers::{find_providers, ServiceProvider};
pub use recommendation::{Category, Priority, Recommendation, RecommendationStatus};
pub use reminder::{
    DueStatus, Frequency, NewReminder, RecurrenceAnchor, Reminder, ReminderPatch, ReminderState,
    SnoozeDuration,
};
pub use repository::{MemoryRepository, Record, Repository};
pub use scheduler::{ReminderScheduler, ReminderSummary};
pub use seasonal::{seasonal_advice, Season};

/// Version string reported by the daemon and CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
