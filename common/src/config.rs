//! Endpoint presets and client tunables.
//!
//! The defaults describe the three public deployments of the upload service.
//! A page can override any field by embedding a JSON document, which is
//! overlaid on the defaults with `ApiConfig::from_json_str`.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown API preset: {0}")]
    UnknownPreset(String),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// One named deployment of the upload service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ApiPreset {
    pub name: String,
    pub base_url: String,
}

impl ApiPreset {
    fn new(name: &str, base_url: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub presets: Vec<ApiPreset>,
    /// Name of the active preset. Not persisted across page loads.
    pub selected: String,
    pub poll_interval_ms: u64,
    pub page_size: usize,
    pub recent_hours: u32,
    pub query_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            presets: vec![
                ApiPreset::new("A", "https://dbi.onrender.com"),
                ApiPreset::new("B", "https://dbi-2xer.onrender.com"),
                ApiPreset::new("C", "https://dbi2.onrender.com"),
            ],
            selected: "B".to_string(),
            poll_interval_ms: 2000,
            page_size: 10,
            recent_hours: 2,
            query_limit: 1000,
        }
    }
}

impl ApiConfig {
    /// Defaults overlaid with the fields present in `json`.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ApiConfig = serde_json::from_str(json)?;
        if config.preset(&config.selected).is_none() {
            return Err(ConfigError::UnknownPreset(config.selected));
        }
        Ok(config)
    }

    pub fn preset(&self, name: &str) -> Option<&ApiPreset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Switches the active preset.
    pub fn select(&mut self, name: &str) -> Result<&ApiPreset, ConfigError> {
        let index = self
            .presets
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?;
        self.selected = name.to_string();
        Ok(&self.presets[index])
    }

    /// Base URL of the active preset, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.preset(&self.selected)
            .map(|p| p.base_url.trim_end_matches('/'))
            .unwrap_or_default()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
