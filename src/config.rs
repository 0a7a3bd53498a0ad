use crate::error::{Result, StoreError};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one JSON document per collection key.
    pub data_dir: String,
    /// Simulated network latency bounds for store operations.
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    /// Seed fixture collections on first open of an empty data dir.
    pub seed_fixtures: bool,
    /// Per-organizer event cap for the current plan; None = unlimited.
    pub plan_event_limit: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            latency_min_ms: 40,
            latency_max_ms: 180,
            seed_fixtures: true,
            plan_event_limit: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub ttl_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ttl_minutes: 60 }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
