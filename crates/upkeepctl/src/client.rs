//! HTTP client for communicating with upkeepd.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use upkeep_common::api::{
    AssetsResponse, ErrorBody, GenerateRequest, GenerateResponse, HealthResponse,
    ProvidersResponse, RecommendationsResponse, ReminderSummary, ReminderView, RemindersResponse,
    SeasonalAdviceResponse, SnoozeRequest,
};
use upkeep_common::{AssetDescriptor, NewReminder, Recommendation};

/// Client for the upkeepd HTTP API
pub struct UpkeepClient {
    http: reqwest::Client,
    base_url: String,
}

/// Query parameters for the active recommendations view
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

impl UpkeepClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Send a request and decode the JSON reply. Non-2xx replies become
    /// errors carrying the daemon's message.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            anyhow!(
                "Cannot reach upkeepd at {}: {}\n\nIs the daemon running? Start it with: upkeepd",
                self.base_url,
                e
            )
        })?;

        let status = response.status();
        let body = response.text().await.context("Failed to read response body")?;

        if !status.is_success() {
            bail!("{}", error_message(status, &body));
        }

        serde_json::from_str(&body).with_context(|| format!("Unexpected response from upkeepd ({})", status))
    }

    // ========================================================================
    // Health
    // ========================================================================

    pub async fn health(&self) -> Result<HealthResponse> {
        self.send(self.request(Method::GET, "/v1/health")).await
    }

    // ========================================================================
    // Assets
    // ========================================================================

    pub async fn assets(&self) -> Result<Vec<AssetDescriptor>> {
        let response: AssetsResponse = self.send(self.request(Method::GET, "/v1/assets")).await?;
        Ok(response.assets)
    }

    // ========================================================================
    // Reminders
    // ========================================================================

    pub async fn reminders(&self, filter: &str) -> Result<Vec<ReminderView>> {
        let request = self
            .request(Method::GET, "/v1/reminders")
            .query(&[("filter", filter)]);
        let response: RemindersResponse = self.send(request).await?;
        Ok(response.reminders)
    }

    pub async fn summary(&self) -> Result<ReminderSummary> {
        self.send(self.request(Method::GET, "/v1/reminders/summary")).await
    }

    pub async fn create_reminder(&self, reminder: &NewReminder) -> Result<ReminderView> {
        self.send(self.request(Method::POST, "/v1/reminders").json(reminder))
            .await
    }

    pub async fn complete_reminder(&self, id: &str) -> Result<ReminderView> {
        let path = format!("/v1/reminders/{}/complete", id);
        self.send(self.request(Method::POST, &path)).await
    }

    pub async fn snooze_reminder(&self, id: &str, duration: &str) -> Result<ReminderView> {
        let path = format!("/v1/reminders/{}/snooze", id);
        let body = SnoozeRequest {
            duration: Some(duration.to_string()),
        };
        self.send(self.request(Method::POST, &path).json(&body)).await
    }

    pub async fn delete_reminder(&self, id: &str) -> Result<Value> {
        let path = format!("/v1/reminders/{}", id);
        self.send(self.request(Method::DELETE, &path)).await
    }

    // ========================================================================
    // Recommendations
    // ========================================================================

    pub async fn generate(&self, asset_id: &str, asset_type: Option<&str>) -> Result<GenerateResponse> {
        let body = GenerateRequest {
            asset_id: Some(asset_id.to_string()),
            asset_type: asset_type.map(str::to_string),
        };
        self.send(self.request(Method::POST, "/v1/recommendations/generate").json(&body))
            .await
    }

    pub async fn recommendations(&self, query: &RecommendationQuery) -> Result<Vec<Recommendation>> {
        let request = self.request(Method::GET, "/v1/recommendations").query(query);
        let response: RecommendationsResponse = self.send(request).await?;
        Ok(response.recommendations)
    }

    pub async fn history(&self, asset_id: Option<&str>) -> Result<Vec<Recommendation>> {
        let mut request = self.request(Method::GET, "/v1/recommendations/history");
        if let Some(asset_id) = asset_id {
            request = request.query(&[("assetId", asset_id)]);
        }
        let response: RecommendationsResponse = self.send(request).await?;
        Ok(response.recommendations)
    }

    pub async fn complete_recommendation(&self, id: &str) -> Result<Recommendation> {
        let path = format!("/v1/recommendations/{}/complete", id);
        self.send(self.request(Method::POST, &path)).await
    }

    pub async fn dismiss_recommendation(&self, id: &str) -> Result<Recommendation> {
        let path = format!("/v1/recommendations/{}/dismiss", id);
        self.send(self.request(Method::POST, &path)).await
    }

    // ========================================================================
    // Advice
    // ========================================================================

    pub async fn seasonal_advice(
        &self,
        asset_type: &str,
        season: Option<&str>,
    ) -> Result<SeasonalAdviceResponse> {
        let mut params = vec![("assetType", asset_type)];
        if let Some(season) = season {
            params.push(("season", season));
        }
        let request = self.request(Method::GET, "/v1/advice/seasonal").query(&params);
        self.send(request).await
    }

    pub async fn providers(&self, service: &str, location: Option<&str>) -> Result<ProvidersResponse> {
        let mut params = vec![("service", service)];
        if let Some(location) = location {
            params.push(("location", location));
        }
        let request = self.request(Method::GET, "/v1/providers").query(&params);
        self.send(request).await
    }
}

/// Human-readable message for a failed reply
pub fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => format!("{} ({})", err.error, status.as_u16()),
        Err(_) if body.trim().is_empty() => format!("upkeepd returned {}", status),
        Err(_) => format!("upkeepd returned {}: {}", status, body.trim()),
    }
}

/// Wrap a value for `--json` output
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join_strips_trailing_slash() {
        let client = UpkeepClient::new("http://localhost:7878/").unwrap();
        assert_eq!(client.url("/v1/health"), "http://localhost:7878/v1/health");
    }

    #[test]
    fn test_error_message_uses_daemon_error() {
        let msg = error_message(
            StatusCode::BAD_REQUEST,
            r#"{"error":"Validation failed: title is required"}"#,
        );
        assert_eq!(msg, "Validation failed: title is required (400)");
    }

    #[test]
    fn test_error_message_without_json_body() {
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, ""),
            "upkeepd returned 404 Not Found"
        );
        assert!(error_message(StatusCode::BAD_GATEWAY, "upstream down").ends_with("upstream down"));
    }
}
