//! Recommendation Generator
//!
//! Turns an asset description into maintenance recommendations. The provider
//! path builds a prompt, calls the LLM under a timeout and parses the reply.
//! Any failure on that path resolves to the deterministic fallback table, so
//! `generate` never fails for a well-formed asset.

pub mod fallback;
pub mod parse;
pub mod prompt;

use crate::asset::AssetDescriptor;
use crate::llm_client::{LlmClient, LlmError};
use crate::recommendation::Recommendation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub use parse::ParseError;

// ============================================================================
// Configuration
// ============================================================================

/// Prompt shaping and output bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Operating-conditions preamble embedded in every prompt
    #[serde(default = "default_regional_context")]
    pub regional_context: String,

    /// Currency symbol the provider should quote costs in
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_min_items")]
    pub min_items: usize,

    /// Provider output beyond this many items is dropped
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

fn default_regional_context() -> String {
    "Hot, dusty West African climate (Lagos, Nigeria) with unstable grid power, \
     variable fuel quality and limited spare-parts availability."
        .to_string()
}

fn default_currency() -> String {
    "₦".to_string()
}

fn default_min_items() -> usize {
    3
}

fn default_max_items() -> usize {
    4
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            regional_context: default_regional_context(),
            currency: default_currency(),
            min_items: default_min_items(),
            max_items: default_max_items(),
        }
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Why the provider path was abandoned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// No provider configured
    NoProvider,
    /// Provider configured but switched off (or missing credentials)
    Disabled,
    Timeout,
    /// Transport, HTTP status or response-envelope failure
    Upstream(String),
    /// Reply did not contain usable recommendations
    Parse(String),
}

impl FallbackReason {
    /// Stable label, used as a metrics dimension
    pub fn label(&self) -> &'static str {
        match self {
            FallbackReason::NoProvider => "no_provider",
            FallbackReason::Disabled => "disabled",
            FallbackReason::Timeout => "timeout",
            FallbackReason::Upstream(_) => "upstream",
            FallbackReason::Parse(_) => "parse",
        }
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::Upstream(detail) | FallbackReason::Parse(detail) => {
                write!(f, "{}: {}", self.label(), detail)
            }
            _ => write!(f, "{}", self.label()),
        }
    }
}

impl From<LlmError> for FallbackReason {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Disabled => FallbackReason::Disabled,
            LlmError::Timeout(_) => FallbackReason::Timeout,
            other => FallbackReason::Upstream(other.to_string()),
        }
    }
}

impl From<ParseError> for FallbackReason {
    fn from(e: ParseError) -> Self {
        FallbackReason::Parse(e.to_string())
    }
}

/// Where a batch came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecommendationSource {
    Provider,
    Fallback { reason: FallbackReason },
}

impl RecommendationSource {
    pub fn label(&self) -> &'static str {
        match self {
            RecommendationSource::Provider => "provider",
            RecommendationSource::Fallback { .. } => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, RecommendationSource::Fallback { .. })
    }
}

/// Recommendations plus their provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub recommendations: Vec<Recommendation>,
    pub source: RecommendationSource,
}

// ============================================================================
// Generator
// ============================================================================

pub struct RecommendationGenerator {
    client: Option<Arc<dyn LlmClient>>,
    config: GeneratorConfig,
    timeout: Duration,
}

impl RecommendationGenerator {
    pub fn new(client: Option<Arc<dyn LlmClient>>, config: GeneratorConfig) -> Self {
        Self {
            client,
            config,
            timeout: Duration::from_secs(15),
        }
    }

    /// Fallback-only generator
    pub fn offline() -> Self {
        Self::new(None, GeneratorConfig::default())
    }

    /// Bound on the whole provider call, including body download
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_provider(&self) -> bool {
        self.client.is_some()
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate recommendations for `asset`; always non-empty
    pub async fn generate(&self, asset: &AssetDescriptor, now: DateTime<Utc>) -> GenerationOutcome {
        match self.from_provider(asset, now).await {
            Ok(recommendations) => {
                info!(
                    "Provider returned {} recommendations for asset {}",
                    recommendations.len(),
                    asset.id
                );
                GenerationOutcome {
                    recommendations,
                    source: RecommendationSource::Provider,
                }
            }
            Err(reason) => {
                if reason == FallbackReason::NoProvider {
                    info!("No provider configured, using rule table for asset {}", asset.id);
                } else {
                    warn!("Provider fallback for asset {}: {}", asset.id, reason);
                }
                GenerationOutcome {
                    recommendations: fallback::recommendations_for(asset, now),
                    source: RecommendationSource::Fallback { reason },
                }
            }
        }
    }

    async fn from_provider(
        &self,
        asset: &AssetDescriptor,
        now: DateTime<Utc>,
    ) -> Result<Vec<Recommendation>, FallbackReason> {
        let client = self.client.as_ref().ok_or(FallbackReason::NoProvider)?;
        let prompt = prompt::build_prompt(asset, &self.config);

        let text = match tokio::time::timeout(self.timeout, client.generate_text(&prompt)).await {
            Ok(result) => result?,
            Err(_) => return Err(FallbackReason::Timeout),
        };

        let items = parse::parse_items(&text)?;
        Ok(items
            .into_iter()
            .take(self.config.max_items.max(1))
            .enumerate()
            .map(|(index, raw)| raw.into_recommendation(&asset.id, index, now))
            .collect())
    }
}
