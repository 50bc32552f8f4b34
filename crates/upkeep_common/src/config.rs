//! Configuration management for upkeep.
//!
//! Loads settings from `$UPKEEP_CONFIG`, then /etc/upkeep/config.toml, or
//! uses defaults. The provider API key may come from the environment.

use crate::generator::GeneratorConfig;
use crate::llm_client::LlmConfig;
use crate::reminder::{RecurrenceAnchor, DEFAULT_UPCOMING_WINDOW_DAYS};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/upkeep/config.toml";

/// Environment variable naming an alternative config file
pub const CONFIG_ENV: &str = "UPKEEP_CONFIG";

/// Provider API key overrides, checked in order
pub const API_KEY_ENVS: [&str; 2] = ["UPKEEP_LLM_API_KEY", "GOOGLE_AI_API_KEY"];

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Load the demo assets and reminders at startup
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
}

fn default_bind_addr() -> String {
    "127.0.0.1:7878".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_seed_demo_data() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            request_timeout_secs: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
            seed_demo_data: default_seed_demo_data(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Reminder scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    /// Width of the UPCOMING window in days
    #[serde(default = "default_upcoming_window")]
    pub upcoming_window_days: i64,

    /// Base of the next occurrence after completion
    #[serde(default)]
    pub recurrence_anchor: RecurrenceAnchor,
}

fn default_upcoming_window() -> i64 {
    DEFAULT_UPCOMING_WINDOW_DAYS
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            upcoming_window_days: default_upcoming_window(),
            recurrence_anchor: RecurrenceAnchor::default(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpkeepConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub reminders: RemindersConfig,
}

impl UpkeepConfig {
    /// Load config from `$UPKEEP_CONFIG` or the system path, or use defaults.
    /// Environment overrides are applied last.
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| CONFIG_PATH.to_string());
        let mut config = Self::load_from_path(&path).unwrap_or_else(|e| {
            warn!("Config not loaded from {}, using defaults: {}", path, e);
            UpkeepConfig::default()
        });

        config.apply_env_overrides(|key| std::env::var(key).ok());

        if !config.llm.is_usable() {
            warn!(
                "LLM provider ({}) unavailable, recommendations will use the rule table",
                config.llm.backend.as_str()
            );
        }
        config
    }

    /// Load config from specific path
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: UpkeepConfig = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`)
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = API_KEY_ENVS
            .iter()
            .find_map(|name| lookup(name).filter(|v| !v.trim().is_empty()));
        if let Some(key) = key {
            self.llm.api_key = Some(key);
        }
    }

    /// Render as TOML (for `--print-config`)
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmBackend;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = UpkeepConfig::default();
        assert_eq!(config.server.bind_addr, "127.0.0.1:7878");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.server.max_body_bytes, 65536);
        assert!(config.server.seed_demo_data);
        assert_eq!(config.llm.timeout_secs, 15);
        assert_eq!(config.reminders.upcoming_window_days, 7);
        assert_eq!(config.reminders.recurrence_anchor, RecurrenceAnchor::Completion);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
bind_addr = "0.0.0.0:9000"

[llm]
backend = "ollama"
endpoint = "http://127.0.0.1:11434"
model = "llama3.2:3b"

[reminders]
upcoming_window_days = 14
recurrence_anchor = "due_date"
"#;
        let config: UpkeepConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.llm.backend, LlmBackend::Ollama);
        assert_eq!(config.llm.model, "llama3.2:3b");
        assert_eq!(config.reminders.upcoming_window_days, 14);
        assert_eq!(config.reminders.recurrence_anchor, RecurrenceAnchor::DueDate);
        // Defaults for missing fields
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.generator.max_items, 4);
        assert!(config.llm.is_usable());
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[generator]\ncurrency = \"GH₵\"\nmax_items = 6").unwrap();

        let config = UpkeepConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.generator.currency, "GH₵");
        assert_eq!(config.generator.max_items, 6);
        assert_eq!(config.generator.min_items, 3);
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        assert!(UpkeepConfig::load_from_path("/nonexistent/upkeep.toml").is_err());
    }

    #[test]
    fn test_env_override_precedence() {
        let env: HashMap<&str, &str> = [
            ("UPKEEP_LLM_API_KEY", "primary"),
            ("GOOGLE_AI_API_KEY", "legacy"),
        ]
        .into_iter()
        .collect();

        let mut config = UpkeepConfig::default();
        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.llm.api_key.as_deref(), Some("primary"));
        assert!(config.llm.is_usable());
    }

    #[test]
    fn test_env_override_legacy_and_blank() {
        let mut config = UpkeepConfig::default();
        config.apply_env_overrides(|k| match k {
            "UPKEEP_LLM_API_KEY" => Some("  ".to_string()),
            "GOOGLE_AI_API_KEY" => Some("legacy".to_string()),
            _ => None,
        });
        assert_eq!(config.llm.api_key.as_deref(), Some("legacy"));

        let mut untouched = UpkeepConfig::default();
        untouched.apply_env_overrides(|_| None);
        assert!(untouched.llm.api_key.is_none());
    }

    #[test]
    fn test_roundtrip_toml() {
        let rendered = UpkeepConfig::default().to_toml().unwrap();
        let parsed: UpkeepConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.server.bind_addr, "127.0.0.1:7878");
    }

    #[test]
    fn test_rendered_config_omits_api_key() {
        let mut config: UpkeepConfig = toml::from_str("[llm]\napi_key = \"from-file\"").unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("from-file"));
        config.apply_env_overrides(|k| (k == "UPKEEP_LLM_API_KEY").then(|| "sk-secret".to_string()));

        let rendered = config.to_toml().unwrap();
        assert!(!rendered.contains("sk-secret"));
        assert!(!rendered.contains("from-file"));
        assert!(!rendered.contains("api_key"));
        assert!(rendered.contains("[llm]"));
    }
}
