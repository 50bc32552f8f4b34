//! API routes for upkeepd
//!
//! Handlers map 1:1 onto the engine operations. Request bodies and query
//! strings that fail to decode are reported as 400, like engine validation
//! errors.

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use upkeep_common::api::{
    AssetsResponse, GenerateRequest, GenerateResponse, HealthResponse, ProvidersResponse,
    RecommendationsResponse, ReminderSummary, ReminderView, RemindersResponse,
    SeasonalAdviceResponse, SnoozeRequest, StatusUpdateRequest,
};
use upkeep_common::helpers::non_blank;
use upkeep_common::{
    find_providers, seasonal_advice, ActiveFilter, ActiveOrder, AssetCatalog, AssetDescriptor,
    AssetType, EngineError, MemoryAssetCatalog, NewAsset, NewReminder, PriorityFilter, Recommendation,
    RecommendationStatus, Reminder, ReminderFilter, ReminderPatch, Season, SnoozeDuration,
};

type AppStateArc = Arc<AppState>;

fn required(value: Option<String>, field: &str) -> Result<String, EngineError> {
    non_blank(value).ok_or_else(|| EngineError::validation(format!("{} is required", field)))
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/health", get(health_check))
        .route("/metrics", get(metrics_export))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: upkeep_common::VERSION.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        provider: state.provider.clone(),
    })
}

async fn metrics_export(State(state): State<AppStateArc>) -> ApiResult<impl IntoResponse> {
    let body = state
        .metrics
        .export()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}

// ============================================================================
// Asset Routes
// ============================================================================

pub fn asset_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/assets", get(list_assets).post(create_asset))
        .route("/v1/assets/:id", get(get_asset))
}

async fn list_assets(State(state): State<AppStateArc>) -> Json<AssetsResponse> {
    let assets = state.assets.read().await;
    Json(AssetsResponse {
        assets: assets.list(),
    })
}

async fn create_asset(
    State(state): State<AppStateArc>,
    payload: Result<Json<NewAsset>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AssetDescriptor>)> {
    let Json(req) = payload?;
    let mut assets = state.assets.write().await;
    let asset = assets.create(req)?;
    Ok((StatusCode::CREATED, Json(asset)))
}

async fn get_asset(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> ApiResult<Json<AssetDescriptor>> {
    let assets = state.assets.read().await;
    let asset = assets
        .get(&id)
        .ok_or_else(|| EngineError::not_found("Asset", &id))?;
    Ok(Json(asset))
}

// ============================================================================
// Reminder Routes
// ============================================================================

pub fn reminder_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/reminders", get(list_reminders).post(create_reminder))
        .route("/v1/reminders/summary", get(reminder_summary))
        .route(
            "/v1/reminders/:id",
            get(get_reminder)
                .patch(update_reminder)
                .delete(delete_reminder),
        )
        .route("/v1/reminders/:id/complete", post(complete_reminder))
        .route("/v1/reminders/:id/snooze", post(snooze_reminder))
}

#[derive(Debug, Default, Deserialize)]
struct ReminderListQuery {
    #[serde(default)]
    filter: Option<String>,
}

fn reminder_view(
    assets: &MemoryAssetCatalog,
    reminder: Reminder,
    now: DateTime<Utc>,
    window: Duration,
) -> ReminderView {
    let asset = assets.get(&reminder.asset_id);
    ReminderView::new(reminder, asset, now, window)
}

async fn list_reminders(
    State(state): State<AppStateArc>,
    query: Result<Query<ReminderListQuery>, QueryRejection>,
) -> ApiResult<Json<RemindersResponse>> {
    let Query(query) = query?;
    let filter = match non_blank(query.filter) {
        Some(raw) => raw.parse::<ReminderFilter>()?,
        None => ReminderFilter::All,
    };

    let now = state.now();
    let assets = state.assets.read().await;
    let scheduler = state.reminders.read().await;
    let window = scheduler.upcoming_window();

    let reminders = scheduler
        .filtered(filter, now)
        .into_iter()
        .map(|r| reminder_view(&assets, r, now, window))
        .collect();

    Ok(Json(RemindersResponse { reminders }))
}

async fn reminder_summary(State(state): State<AppStateArc>) -> Json<ReminderSummary> {
    let scheduler = state.reminders.read().await;
    Json(scheduler.summary(state.now()))
}

async fn create_reminder(
    State(state): State<AppStateArc>,
    payload: Result<Json<NewReminder>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ReminderView>)> {
    let Json(req) = payload?;
    let now = state.now();

    let assets = state.assets.read().await;
    let mut scheduler = state.reminders.write().await;
    let reminder = scheduler.create(req, &*assets, now)?;
    state.metrics.record_reminder("create");

    let view = reminder_view(&assets, reminder, now, scheduler.upcoming_window());
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_reminder(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReminderView>> {
    let now = state.now();
    let assets = state.assets.read().await;
    let scheduler = state.reminders.read().await;
    let reminder = scheduler.get(&id)?;
    Ok(Json(reminder_view(&assets, reminder, now, scheduler.upcoming_window())))
}

async fn update_reminder(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    payload: Result<Json<ReminderPatch>, JsonRejection>,
) -> ApiResult<Json<ReminderView>> {
    let Json(patch) = payload?;
    if patch.is_empty() {
        return Err(EngineError::validation("no fields to update").into());
    }
    let now = state.now();

    let assets = state.assets.read().await;
    let mut scheduler = state.reminders.write().await;
    let reminder = scheduler.edit(&id, patch, &*assets, now)?;
    state.metrics.record_reminder("edit");

    Ok(Json(reminder_view(&assets, reminder, now, scheduler.upcoming_window())))
}

async fn delete_reminder(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut scheduler = state.reminders.write().await;
    scheduler.remove(&id)?;
    state.metrics.record_reminder("remove");
    Ok(Json(serde_json::json!({ "deleted": id })))
}

async fn complete_reminder(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReminderView>> {
    let now = state.now();
    let assets = state.assets.read().await;
    let mut scheduler = state.reminders.write().await;
    let reminder = scheduler.complete(&id, now)?;
    state.metrics.record_reminder("complete");

    Ok(Json(reminder_view(&assets, reminder, now, scheduler.upcoming_window())))
}

async fn snooze_reminder(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    payload: Result<Json<SnoozeRequest>, JsonRejection>,
) -> ApiResult<Json<ReminderView>> {
    let Json(req) = payload?;
    let duration: SnoozeDuration = required(req.duration, "duration")?.parse()?;
    let now = state.now();

    let assets = state.assets.read().await;
    let mut scheduler = state.reminders.write().await;
    let reminder = scheduler.snooze(&id, duration, now)?;
    state.metrics.record_reminder("snooze");

    Ok(Json(reminder_view(&assets, reminder, now, scheduler.upcoming_window())))
}

// ============================================================================
// Recommendation Routes
// ============================================================================

pub fn recommendation_routes() -> Router<AppStateArc> {
    Router::new()
        .route(
            "/v1/recommendations",
            get(list_recommendations).put(update_recommendation_status),
        )
        .route("/v1/recommendations/history", get(recommendation_history))
        .route("/v1/recommendations/generate", post(generate_recommendations))
        .route("/v1/recommendations/:id/complete", post(complete_recommendation))
        .route("/v1/recommendations/:id/dismiss", post(dismiss_recommendation))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationListQuery {
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    asset_id: Option<String>,
    #[serde(default)]
    order: Option<String>,
}

fn parse_order(raw: Option<String>) -> Result<ActiveOrder, EngineError> {
    match non_blank(raw).map(|s| s.to_ascii_lowercase()).as_deref() {
        None | Some("insertion") => Ok(ActiveOrder::Insertion),
        Some("priority") => Ok(ActiveOrder::Priority),
        Some(other) => Err(EngineError::validation(format!(
            "order must be 'insertion' or 'priority' (got '{}')",
            other
        ))),
    }
}

async fn list_recommendations(
    State(state): State<AppStateArc>,
    query: Result<Query<RecommendationListQuery>, QueryRejection>,
) -> ApiResult<Json<RecommendationsResponse>> {
    let Query(query) = query?;
    let priority = match non_blank(query.priority) {
        Some(raw) => raw.parse::<PriorityFilter>()?,
        None => PriorityFilter::All,
    };
    let filter = ActiveFilter {
        priority: match priority {
            PriorityFilter::All => None,
            PriorityFilter::Only(p) => Some(p),
        },
        asset_id: non_blank(query.asset_id),
    };
    let order = parse_order(query.order)?;

    let recs = state.recommendations.read().await;
    Ok(Json(RecommendationsResponse {
        recommendations: recs.list_active(&filter, order),
    }))
}

async fn recommendation_history(
    State(state): State<AppStateArc>,
    query: Result<Query<RecommendationListQuery>, QueryRejection>,
) -> ApiResult<Json<RecommendationsResponse>> {
    let Query(query) = query?;
    let asset_id = non_blank(query.asset_id);

    let recs = state.recommendations.read().await;
    Ok(Json(RecommendationsResponse {
        recommendations: recs.history(asset_id.as_deref()),
    }))
}

async fn generate_recommendations(
    State(state): State<AppStateArc>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GenerateResponse>)> {
    let Json(req) = payload?;
    let asset_id = required(req.asset_id, "assetId")?;

    // Catalog entry wins; an explicit type describes an ad-hoc asset
    let asset = {
        let assets = state.assets.read().await;
        match (assets.get(&asset_id), non_blank(req.asset_type)) {
            (Some(asset), _) => asset,
            (None, Some(raw_type)) => {
                AssetDescriptor::new(asset_id.clone(), AssetType::parse_lenient(&raw_type))
            }
            (None, None) => return Err(EngineError::not_found("Asset", &asset_id).into()),
        }
    };

    info!("  Generating recommendations for asset {} ({})", asset.id, asset.asset_type);
    let now = state.now();
    let outcome = state.generator.generate(&asset, now).await;
    state
        .metrics
        .record_generation(&outcome.source, outcome.recommendations.len());

    let merged = {
        let mut recs = state.recommendations.write().await;
        recs.merge_batch(&asset.id, outcome.recommendations)
    };

    Ok((
        StatusCode::CREATED,
        Json(GenerateResponse {
            recommendations: merged.stored,
            source: outcome.source,
            merge: merged.report,
        }),
    ))
}

/// Apply a status, counting only real transitions
async fn apply_status(
    state: &AppState,
    id: &str,
    status: RecommendationStatus,
) -> ApiResult<Recommendation> {
    let mut recs = state.recommendations.write().await;
    let before = recs.get(id)?.status;
    let rec = recs.set_status(id, status)?;
    if before != rec.status {
        state.metrics.record_recommendation(rec.status);
    }
    Ok(rec)
}

async fn complete_recommendation(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> ApiResult<Json<Recommendation>> {
    Ok(Json(apply_status(&state, &id, RecommendationStatus::Completed).await?))
}

async fn dismiss_recommendation(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> ApiResult<Json<Recommendation>> {
    Ok(Json(apply_status(&state, &id, RecommendationStatus::Dismissed).await?))
}

async fn update_recommendation_status(
    State(state): State<AppStateArc>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> ApiResult<Json<Recommendation>> {
    let Json(req) = payload?;
    let id = required(req.recommendation_id, "recommendationId")?;
    let status: RecommendationStatus = required(req.status, "status")?.parse()?;
    Ok(Json(apply_status(&state, &id, status).await?))
}

// ============================================================================
// Advice Routes
// ============================================================================

pub fn advice_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/advice/seasonal", get(seasonal))
        .route("/v1/providers", get(providers))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeasonalQuery {
    #[serde(default)]
    asset_type: Option<String>,
    #[serde(default)]
    season: Option<String>,
}

async fn seasonal(
    State(state): State<AppStateArc>,
    query: Result<Query<SeasonalQuery>, QueryRejection>,
) -> ApiResult<Json<SeasonalAdviceResponse>> {
    let Query(query) = query?;
    let asset_type = AssetType::parse_lenient(&required(query.asset_type, "assetType")?);
    let season = match non_blank(query.season) {
        Some(raw) => raw.parse::<Season>()?,
        None => Season::at(state.now()),
    };

    Ok(Json(SeasonalAdviceResponse {
        asset_type: asset_type.as_str().to_string(),
        season,
        advice: seasonal_advice(asset_type, season)
            .into_iter()
            .map(str::to_string)
            .collect(),
    }))
}

#[derive(Debug, Default, Deserialize)]
struct ProvidersQuery {
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    location: Option<String>,
}

async fn providers(
    query: Result<Query<ProvidersQuery>, QueryRejection>,
) -> ApiResult<Json<ProvidersResponse>> {
    let Query(query) = query?;
    let service = required(query.service, "service")?;
    let location = non_blank(query.location);

    Ok(Json(ProvidersResponse {
        providers: find_providers(&service, location.as_deref()),
    }))
}
