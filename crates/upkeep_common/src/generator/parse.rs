//! Interpretation of untrusted provider output.
//!
//! The response is free text that should contain one JSON array of objects.
//! The first array holding at least one object wins; everything around it
//! (prose, markdown fences) is ignored.

use crate::recommendation::{Category, Priority, Recommendation, RecommendationStatus};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

/// Timeframe used when the provider omits one
pub const DEFAULT_TIMEFRAME: &str = "As soon as practical";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("no JSON array in provider response")]
    NoJsonArray,

    #[error("malformed JSON array: {0}")]
    Malformed(String),

    #[error("provider returned no usable recommendations")]
    Empty,
}

/// One provider item after lenient field extraction
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecommendation {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub estimated_cost: Option<String>,
    pub timeframe: Option<String>,
}

/// Locate the first JSON array of objects inside `text`
pub fn extract_json_array(text: &str) -> Result<Vec<Value>, ParseError> {
    let mut last_error: Option<String> = None;

    for (start, _) in text.match_indices('[') {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Array(items))) if items.iter().any(Value::is_object) => {
                return Ok(items);
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                if last_error.is_none() {
                    last_error = Some(e.to_string());
                }
            }
            None => {}
        }
    }

    Err(match last_error {
        Some(e) => ParseError::Malformed(e),
        None => ParseError::NoJsonArray,
    })
}

/// Read a field as text; numbers are accepted, blanks and other shapes are not
fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Parse provider text into raw items, dropping items without a title
pub fn parse_items(text: &str) -> Result<Vec<RawRecommendation>, ParseError> {
    let items: Vec<RawRecommendation> = extract_json_array(text)?
        .iter()
        .filter_map(|value| {
            let obj = value.as_object()?;
            let Some(title) = text_field(obj, &["title"]) else {
                debug!("Skipping provider item without title");
                return None;
            };
            Some(RawRecommendation {
                title,
                description: text_field(obj, &["description"]),
                priority: text_field(obj, &["priority"]),
                category: text_field(obj, &["category"]),
                estimated_cost: text_field(obj, &["estimatedCost", "estimated_cost"]),
                timeframe: text_field(obj, &["timeframe"]),
            })
        })
        .collect();

    if items.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(items)
}

impl RawRecommendation {
    /// Bind to an asset, coercing enum fields to safe defaults
    pub fn into_recommendation(
        self,
        asset_id: &str,
        index: usize,
        now: DateTime<Utc>,
    ) -> Recommendation {
        Recommendation {
            id: format!("ai-{}-{}", asset_id, index),
            asset_id: asset_id.to_string(),
            title: self.title,
            description: self.description.unwrap_or_default(),
            priority: Priority::coerce(self.priority.as_deref()),
            category: Category::coerce(self.category.as_deref()),
            estimated_cost: self.estimated_cost,
            timeframe: self
                .timeframe
                .unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string()),
            status: RecommendationStatus::Pending,
            created_at: now,
        }
    }
}
