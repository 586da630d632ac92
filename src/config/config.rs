use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::api_client::DEFAULT_API_URL;
use crate::models::{MatchingSettings, RandomStrategySettings, Settings};
use crate::utils::app_paths::AppPaths;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    /// Persisted matching-strategy selection, passed through to the backend
    /// on every fetch/submit/skip.
    pub matching: MatchingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the vidrank backend.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            matching: MatchingSettings {
                random_strategy: Some(RandomStrategySettings::default()),
                ..MatchingSettings::default()
            },
        }
    }
}

impl Config {
    /// Load config from the default location, writing the defaults there on
    /// first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to(path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::config_file()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// The request-shaped settings object derived from this config.
    pub fn settings(&self) -> Settings {
        Settings {
            matching_settings: self.matching.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ByDateStrategySettings;

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.api.base_url = "http://ranker.local:9000".to_string();
        config.matching = MatchingSettings {
            by_date_strategy: Some(ByDateStrategySettings { days: 30 }),
            ..MatchingSettings::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api.base_url, "http://ranker.local:9000");
        assert_eq!(
            loaded.matching.by_date_strategy,
            Some(ByDateStrategySettings { days: 30 })
        );
        assert!(loaded.matching.random_strategy.is_none());
    }

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert!(config.matching.random_strategy.is_some());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api]\nbase_url = \"http://other:8000\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api.base_url, "http://other:8000");
        // Missing sections come from Config::default(), which enables the
        // random strategy.
        assert_eq!(config.matching, Config::default().matching);
    }
}
