use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "SKYCAST_API_KEY";

/// Shared demo key with strict rate limits. Last-resort fallback so the app
/// works out of the box; real deployments configure their own key.
pub const DEMO_API_KEY: &str = "b1946ac92492d2347c6235b4d2611184";

const DEFAULT_LANG: &str = "en";

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    /// Language code passed to the provider for condition descriptions.
    pub lang: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key precedence: environment variable, config file, shared demo
    /// key.
    pub fn resolved_api_key(&self) -> String {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return key;
            }
        }

        match &self.api_key {
            Some(key) if !key.trim().is_empty() => key.clone(),
            _ => DEMO_API_KEY.to_string(),
        }
    }

    /// Language code, defaulting to English.
    pub fn resolved_lang(&self) -> String {
        match &self.lang {
            Some(lang) if !lang.trim().is_empty() => lang.clone(),
            _ => DEFAULT_LANG.to_string(),
        }
    }

    pub fn is_using_demo_key(&self) -> bool {
        self.resolved_api_key() == DEMO_API_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_key_wins_over_demo_fallback() {
        let cfg = Config {
            api_key: Some("MY_KEY".to_string()),
            lang: None,
        };

        assert_eq!(cfg.resolved_api_key(), "MY_KEY");
        assert!(!cfg.is_using_demo_key());
    }

    #[test]
    fn blank_key_falls_back_to_demo() {
        let cfg = Config {
            api_key: Some("   ".to_string()),
            lang: None,
        };

        assert_eq!(cfg.resolved_api_key(), DEMO_API_KEY);
        assert!(cfg.is_using_demo_key());
    }

    #[test]
    fn lang_defaults_to_english() {
        let cfg = Config::default();
        assert_eq!(cfg.resolved_lang(), "en");

        let cfg = Config {
            api_key: None,
            lang: Some("tr".to_string()),
        };
        assert_eq!(cfg.resolved_lang(), "tr");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = Config {
            api_key: Some("MY_KEY".to_string()),
            lang: Some("en".to_string()),
        };

        let raw = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&raw).expect("parse");
        assert_eq!(parsed.api_key.as_deref(), Some("MY_KEY"));
        assert_eq!(parsed.lang.as_deref(), Some("en"));
    }
}
