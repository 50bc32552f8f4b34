//! LLM Client Abstraction
//!
//! Generic interface for calling a generative text provider.
//! Supports real HTTP backends (Gemini, Ollama, OpenAI-compatible) and a fake
//! client for testing. Callers treat every error as "provider unavailable".

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

/// Wire protocol spoken by the provider endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Google Generative Language API (`generateContent`)
    #[default]
    Gemini,
    /// Ollama `/api/generate`
    Ollama,
    /// OpenAI-compatible `/v1/chat/completions`
    #[serde(rename = "openai")]
    OpenAi,
}

impl LlmBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmBackend::Gemini => "gemini",
            LlmBackend::Ollama => "ollama",
            LlmBackend::OpenAi => "openai",
        }
    }

    fn requires_api_key(&self) -> bool {
        matches!(self, LlmBackend::Gemini | LlmBackend::OpenAi)
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub backend: LlmBackend,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Read from the config file or environment, never written back out
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Upper bound on a single provider call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-pro".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            backend: LlmBackend::default(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Enabled and, where the backend needs one, holding an API key
    pub fn is_usable(&self) -> bool {
        self.enabled && (!self.backend.requires_api_key() || self.api_key.is_some())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// LLM errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("LLM is disabled in configuration")]
    Disabled,

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("LLM returned empty response")]
    EmptyResponse,
}

/// Generic LLM client trait: prompt in, free text out
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Real LLM client implementation using HTTP
pub struct HttpLlmClient {
    config: LlmConfig,
    client: reqwest::Client,
}

impl HttpLlmClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.config.timeout_secs)
        } else {
            LlmError::HttpError(format!("Request failed: {}", e))
        }
    }

    async fn post_json(
        &self,
        request: reqwest::RequestBuilder,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, LlmError> {
        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(LlmError::HttpError(format!(
                "HTTP {} from {}",
                response.status(),
                self.config.backend.as_str()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::InvalidJson(format!("Failed to parse response: {}", e)))
    }

    /// Call the Gemini `generateContent` API
    async fn call_gemini(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.config.api_key.as_deref().ok_or(LlmError::Disabled)?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let json = self
            .post_json(self.client.post(&url).query(&[("key", api_key)]), &body)
            .await?;

        json.get("candidates")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.get("parts"))
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("text"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(LlmError::EmptyResponse)
    }

    /// Call Ollama-style API
    async fn call_ollama(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));

        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
        });

        let json = self.post_json(self.client.post(&url), &body).await?;

        json.get("response")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(LlmError::EmptyResponse)
    }

    /// Call OpenAI-compatible API
    async fn call_openai_compatible(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "user", "content": prompt},
            ],
        });

        let mut request = self.client.post(&url);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let json = self.post_json(request, &body).await?;

        json.get("choices")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("message"))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        if !self.config.is_usable() {
            return Err(LlmError::Disabled);
        }

        let text = match self.config.backend {
            LlmBackend::Gemini => self.call_gemini(prompt).await?,
            LlmBackend::Ollama => self.call_ollama(prompt).await?,
            LlmBackend::OpenAi => self.call_openai_compatible(prompt).await?,
        };

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Fake LLM client for testing
pub struct FakeLlmClient {
    responses: Mutex<Vec<Result<String, LlmError>>>,
    call_count: Mutex<usize>,
    delay: Option<Duration>,
}

impl FakeLlmClient {
    /// Create a fake client with pre-defined responses
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: Mutex::new(0),
            delay: None,
        }
    }

    /// Create a fake client that always returns this text
    pub fn always_text(text: impl Into<String>) -> Self {
        Self::new(vec![Ok(text.into())])
    }

    /// Create a fake client that always returns an error
    pub fn always_error(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Sleep before answering (exercises caller timeouts)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of calls made
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_response(&self) -> Result<String, LlmError> {
        *self.call_count.lock().unwrap_or_else(|e| e.into_inner()) += 1;

        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        match responses.len() {
            0 => Err(LlmError::EmptyResponse),
            // Keep returning the last response
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}

#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn generate_text(&self, _prompt: &str) -> Result<String, LlmError> {
        let response = self.next_response();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        response
    }
}
