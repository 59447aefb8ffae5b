//! Configuration loading and management for steamsnap.
//!
//! Loads settings from `steamsnap.toml` with environment variable overrides for sensitive data.
//! Every section has defaults, so running without a config file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE: &str = "steamsnap.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing required API key for provider: {0}")]
    MissingApiKey(String),
    #[error("unsupported LLM provider: {0}")]
    UnsupportedProvider(String),
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// LLM provider, currently only "gemini"
    pub provider: String,
    /// Model identifier (e.g., "gemini-2.5-flash-lite")
    pub model: String,
    /// Output token budget per call
    pub max_output_tokens: u32,
    /// API root, overridable for proxies
    pub base_url: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash-lite".to_string(),
            max_output_tokens: 256,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

/// API keys configuration (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub gemini_key: Option<String>,
}

/// Storage paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding cached summaries
    pub cache: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache: PathBuf::from(".cache/llm_cache.json"),
        }
    }
}

/// Summary contract tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummariseConfig {
    pub retries: u32,
    pub backoff_secs: f64,
    pub accept_min: usize,
    pub accept_max: usize,
    pub extreme_min: usize,
    pub extreme_max: usize,
}

impl SummariseConfig {
    /// Reject bounds and delays the summariser cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if std::time::Duration::try_from_secs_f64(self.backoff_secs).is_err() {
            return Err(ConfigError::InvalidValue(format!(
                "summarise.backoff_secs must be a finite, non-negative number of seconds, got {}",
                self.backoff_secs
            )));
        }
        if self.accept_min > self.accept_max {
            return Err(ConfigError::InvalidValue(format!(
                "summarise.accept_min ({}) is greater than summarise.accept_max ({})",
                self.accept_min, self.accept_max
            )));
        }
        if self.extreme_min > self.extreme_max {
            return Err(ConfigError::InvalidValue(format!(
                "summarise.extreme_min ({}) is greater than summarise.extreme_max ({})",
                self.extreme_min, self.extreme_max
            )));
        }
        Ok(())
    }
}

impl Default for SummariseConfig {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff_secs: 0.8,
            accept_min: 8,
            accept_max: 12,
            extreme_min: 6,
            extreme_max: 16,
        }
    }
}

/// Steam endpoints and lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SteamConfig {
    pub app_list_url: String,
    /// Review endpoint; `{appid}` is replaced with the resolved app id
    pub reviews_url: String,
    /// Minimum similarity for fuzzy title matches
    pub fuzzy_cutoff: f64,
    pub language: String,
    pub filter: String,
    /// First delay between retried requests, doubled each time
    pub retry_backoff_ms: u64,
}

impl Default for SteamConfig {
    fn default() -> Self {
        Self {
            app_list_url: "https://api.steampowered.com/ISteamApps/GetAppList/v2/".to_string(),
            reviews_url: "https://store.steampowered.com/appreviews/{appid}".to_string(),
            fuzzy_cutoff: 0.68,
            language: "english".to_string(),
            filter: "all".to_string(),
            retry_backoff_ms: 500,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub summarise: SummariseConfig,
    #[serde(default)]
    pub steam: SteamConfig,
}

impl Config {
    /// Load configuration from the default location (steamsnap.toml in cwd or home),
    /// falling back to defaults when no file exists
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_file() {
            Some(path) => Self::load_from(&path),
            None => {
                let mut config = Config::default();
                config.apply_env();
                Ok(config)
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.apply_env();
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.summarise.validate()?;
        Ok(config)
    }

    /// Override API keys from environment variables
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                self.api.gemini_key = Some(key);
            }
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        dirs::home_dir()
            .map(|home| home.join(".config").join("steamsnap").join(CONFIG_FILE))
            .filter(|path| path.exists())
    }

    /// Get the API key for the configured provider
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        match self.agent.provider.as_str() {
            "gemini" => self
                .api
                .gemini_key
                .as_deref()
                .ok_or_else(|| ConfigError::MissingApiKey("gemini".to_string())),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
