//! HTTP server for upkeepd

use crate::metrics::EngineMetrics;
use crate::routes;
use crate::seed;
use anyhow::Result;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use upkeep_common::api::ProviderInfo;
use upkeep_common::config::{RemindersConfig, ServerConfig};
use upkeep_common::{
    HttpLlmClient, LlmClient, MemoryAssetCatalog, RecommendationGenerator, RecommendationLifecycle,
    ReminderScheduler, UpkeepConfig,
};

/// Source of "now" for every time-dependent operation
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Application state shared across handlers.
///
/// One lock per collection. Handlers that need several take them in the
/// order assets, reminders, recommendations.
pub struct AppState {
    pub assets: Arc<RwLock<MemoryAssetCatalog>>,
    pub reminders: Arc<RwLock<ReminderScheduler>>,
    pub recommendations: Arc<RwLock<RecommendationLifecycle>>,
    pub generator: Arc<RecommendationGenerator>,
    pub metrics: EngineMetrics,
    pub provider: ProviderInfo,
    pub start_time: Instant,
    clock: Clock,
}

impl AppState {
    /// Empty state around a generator
    pub fn new(
        generator: RecommendationGenerator,
        reminders: &RemindersConfig,
        provider: ProviderInfo,
    ) -> Result<Self> {
        let scheduler = ReminderScheduler::in_memory()
            .with_upcoming_window(reminders.upcoming_window_days)
            .with_anchor(reminders.recurrence_anchor);

        Ok(Self {
            assets: Arc::new(RwLock::new(MemoryAssetCatalog::new())),
            reminders: Arc::new(RwLock::new(scheduler)),
            recommendations: Arc::new(RwLock::new(RecommendationLifecycle::in_memory())),
            generator: Arc::new(generator),
            metrics: EngineMetrics::new()?,
            provider,
            start_time: Instant::now(),
            clock: Arc::new(Utc::now),
        })
    }

    /// Build the full state from configuration, seeding demo data if enabled
    pub fn from_config(config: &UpkeepConfig) -> Result<Self> {
        let client: Option<Arc<dyn LlmClient>> = if config.llm.is_usable() {
            Some(Arc::new(HttpLlmClient::new(config.llm.clone())?))
        } else {
            None
        };

        let provider = ProviderInfo {
            enabled: client.is_some(),
            backend: config.llm.backend.as_str().to_string(),
            model: config.llm.model.clone(),
        };

        let generator = RecommendationGenerator::new(client, config.generator.clone())
            .with_timeout(config.llm.timeout());

        let state = Self::new(generator, &config.reminders, provider)?;

        if config.server.seed_demo_data {
            state.seed_demo_data()?;
        }
        Ok(state)
    }

    /// Replace the clock (tests pin "now")
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Load the demo data set. Only valid before the state is shared.
    pub fn seed_demo_data(&self) -> Result<()> {
        let (Ok(mut assets), Ok(mut reminders), Ok(mut recs)) = (
            self.assets.try_write(),
            self.reminders.try_write(),
            self.recommendations.try_write(),
        ) else {
            anyhow::bail!("state already in use, cannot seed");
        };
        seed::seed_demo_data(&mut assets, &mut reminders, &mut recs, self.now())?;
        Ok(())
    }
}

/// Assemble the router with all routes and middleware layers
pub fn app(state: Arc<AppState>, server: &ServerConfig) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::asset_routes())
        .merge(routes::reminder_routes())
        .merge(routes::recommendation_routes())
        .merge(routes::advice_routes())
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(server.max_body_bytes))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server
pub async fn run(config: UpkeepConfig) -> Result<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    info!(
        "  LLM provider: {} ({}, {})",
        if state.provider.enabled { "enabled" } else { "disabled" },
        state.provider.backend,
        state.provider.model
    );

    let app = app(state, &config.server);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!("  Listening on http://{}", config.server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down gracefully");
    }
}
