//! Asset descriptors and the asset collaborator seam.
//!
//! The engine only reads assets. `MemoryAssetCatalog` is the in-process
//! stand-in for the asset-management service.

use crate::error::{EngineError, EngineResult};
use crate::helpers::{non_blank, parse_timestamp};
use crate::repository::{MemoryRepository, Record, Repository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Kind of physical asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    #[default]
    Car,
    Generator,
    Appliance,
    Other,
}

impl AssetType {
    pub const ALL: [AssetType; 4] = [
        AssetType::Car,
        AssetType::Generator,
        AssetType::Appliance,
        AssetType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Car => "CAR",
            AssetType::Generator => "GENERATOR",
            AssetType::Appliance => "APPLIANCE",
            AssetType::Other => "OTHER",
        }
    }

    /// Lowercase label used in prompts and CLI output
    pub fn label(&self) -> &'static str {
        match self {
            AssetType::Car => "car",
            AssetType::Generator => "generator",
            AssetType::Appliance => "appliance",
            AssetType::Other => "other",
        }
    }

    /// Parse a type coming from an untrusted caller.
    ///
    /// Unknown values map to `Other`, whose fallback templates are the CAR set.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.parse() {
            Ok(asset_type) => asset_type,
            Err(_) => {
                warn!("Unknown asset type '{}', treating as OTHER", raw);
                AssetType::Other
            }
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CAR" => Ok(AssetType::Car),
            "GENERATOR" => Ok(AssetType::Generator),
            "APPLIANCE" => Ok(AssetType::Appliance),
            "OTHER" => Ok(AssetType::Other),
            _ => Err(EngineError::validation(format!(
                "type must be one of CAR, GENERATOR, APPLIANCE, OTHER (got '{}')",
                s
            ))),
        }
    }
}

/// Passive description of a physical asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,
}

impl AssetDescriptor {
    pub fn new(id: impl Into<String>, asset_type: AssetType) -> Self {
        Self {
            id: id.into(),
            name: None,
            asset_type,
            brand: None,
            model: None,
            purchase_date: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_brand_model(mut self, brand: impl Into<String>, model: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self.model = Some(model.into());
        self
    }

    pub fn with_purchase_date(mut self, date: DateTime<Utc>) -> Self {
        self.purchase_date = Some(date);
        self
    }

    /// Name for display: explicit name, else "brand model", else the type label
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let parts: Vec<&str> = [self.brand.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            self.asset_type.label().to_string()
        } else {
            parts.join(" ")
        }
    }
}

impl Record for AssetDescriptor {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Read-only lookup of assets by id
pub trait AssetCatalog: Send + Sync {
    fn get(&self, id: &str) -> Option<AssetDescriptor>;

    fn list(&self) -> Vec<AssetDescriptor>;

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

/// Asset creation request (fields arrive untrusted)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<String>,
}

impl NewAsset {
    /// Validate and convert into a descriptor with the given id
    pub fn into_descriptor(self, id: String) -> EngineResult<AssetDescriptor> {
        let name = non_blank(self.name)
            .ok_or_else(|| EngineError::validation("Asset name is required"))?;

        let asset_type: AssetType = self
            .asset_type
            .as_deref()
            .ok_or_else(|| EngineError::validation("Asset type is required"))?
            .parse()?;

        // An empty string is accepted as "no purchase date"
        let purchase_date = match non_blank(self.purchase_date) {
            Some(raw) => Some(parse_timestamp(&raw).ok_or_else(|| {
                EngineError::validation(format!("purchaseDate '{}' is not a valid date", raw))
            })?),
            None => None,
        };

        Ok(AssetDescriptor {
            id,
            name: Some(name),
            asset_type,
            brand: non_blank(self.brand),
            model: non_blank(self.model),
            purchase_date,
        })
    }
}

/// In-memory asset catalog
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetCatalog {
    repo: MemoryRepository<AssetDescriptor>,
}

impl MemoryAssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a creation request and store it under a fresh UUID
    pub fn create(&mut self, input: NewAsset) -> EngineResult<AssetDescriptor> {
        let asset = input.into_descriptor(uuid::Uuid::new_v4().to_string())?;
        info!("Created asset {} ({})", asset.id, asset.asset_type);
        self.repo.upsert(asset.clone());
        Ok(asset)
    }

    /// Insert a descriptor as-is (seed data, tests)
    pub fn insert(&mut self, asset: AssetDescriptor) {
        self.repo.upsert(asset);
    }

    pub fn len(&self) -> usize {
        self.repo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repo.is_empty()
    }
}

impl AssetCatalog for MemoryAssetCatalog {
    fn get(&self, id: &str) -> Option<AssetDescriptor> {
        self.repo.get(id)
    }

    fn list(&self) -> Vec<AssetDescriptor> {
        self.repo.list()
    }
}
