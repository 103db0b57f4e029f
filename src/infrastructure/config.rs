//! Configuration infrastructure
//!
//! Settings are read from a JSON file under the user config directory and
//! then overridden by `SITE_INSPECTOR__*` environment variables, e.g.
//! `SITE_INSPECTOR__FETCH__ATTEMPT_TIMEOUT_SECONDS=5`. Every section falls
//! back to its defaults, so a missing file is not an error.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub parsing: ParsingConfig,
    pub logging: LoggingConfig,
    pub recommendations: RecommendationConfig,
}

/// Relay fetch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Upper bound for a single relay attempt
    pub attempt_timeout_seconds: u64,

    /// User agent sent to the relays
    pub user_agent: String,

    /// Rate limit shared by all relay requests
    pub max_requests_per_second: u32,

    pub follow_redirects: bool,

    /// Relays in the order they are tried
    pub relays: Vec<RelayConfig>,
}

/// How a relay wraps the target page's body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayEnvelope {
    /// JSON object whose `contents` field holds the page
    JsonContents,
    /// Page body returned as-is
    RawText,
}

/// A single third-party relay endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub name: String,

    /// Request URL with a `{url}` placeholder for the encoded target
    pub url_template: String,

    pub envelope: RelayEnvelope,
}

impl RelayConfig {
    pub fn new(name: &str, url_template: &str, envelope: RelayEnvelope) -> Self {
        Self {
            name: name.to_string(),
            url_template: url_template.to_string(),
            envelope,
        }
    }
}

/// Document parser settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Recover from malformed markup instead of rejecting it
    pub tolerate_malformed_markup: bool,

    /// Colors kept in the CSS census
    pub max_detected_colors: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    pub console_output: bool,

    pub file_output: bool,

    /// Prefix of the daily rolling log file
    pub file_name_prefix: String,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

/// Optional text-generation service used for audit recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub enabled: bool,

    /// OpenAI-compatible chat completions endpoint
    pub endpoint: String,

    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    pub temperature: f32,

    pub timeout_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_seconds: defaults::ATTEMPT_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            follow_redirects: true,
            relays: relays::default_relays(),
        }
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            tolerate_malformed_markup: true,
            max_detected_colors: defaults::MAX_DETECTED_COLORS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            file_name_prefix: defaults::LOG_FILE_NAME_PREFIX.to_string(),
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "warn".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "error".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: defaults::RECOMMENDATION_ENDPOINT.to_string(),
            model: defaults::RECOMMENDATION_MODEL.to_string(),
            api_key_env: defaults::RECOMMENDATION_API_KEY_ENV.to_string(),
            temperature: defaults::RECOMMENDATION_TEMPERATURE,
            timeout_seconds: defaults::RECOMMENDATION_TIMEOUT_SECONDS,
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
    env_source: Option<HashMap<String, String>>,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Manager for the default config file location
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self::with_path(config_path))
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            env_source: None,
        }
    }

    /// Read overrides from the given map instead of the process environment
    pub fn with_env_source(mut self, vars: HashMap<String, String>) -> Self {
        self.env_source = Some(vars);
        self
    }

    /// Load the file (if present) and apply environment overrides
    pub fn load_config(&self) -> Result<AppConfig> {
        let environment = Environment::with_prefix(defaults::ENV_PREFIX)
            .prefix_separator(defaults::ENV_SEPARATOR)
            .separator(defaults::ENV_SEPARATOR)
            .try_parsing(true)
            .source(self.env_source.clone());

        let settings = Config::builder()
            .add_source(
                File::from(self.config_path.as_path())
                    .format(FileFormat::Json)
                    .required(false),
            )
            .add_source(environment)
            .build()
            .with_context(|| format!("Failed to read configuration from {:?}", self.config_path))?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Configuration has an invalid shape")?;

        if self.config_path.exists() {
            info!("Loaded configuration from: {:?}", self.config_path);
        } else {
            info!("Configuration file not found, using defaults: {:?}", self.config_path);
        }
        Ok(config)
    }

    /// Write the given configuration as pretty JSON, creating parent directories
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(dir) = self.config_path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create config directory {dir:?}"))?;
        }

        let content = serde_json::to_string_pretty(config)
            .context("Failed to serialize configuration")?;
        fs::write(&self.config_path, content)
            .await
            .with_context(|| format!("Failed to write configuration to {:?}", self.config_path))?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }
}

/// Default relay endpoints, tried in this order
pub mod relays {
    use super::{RelayConfig, RelayEnvelope};

    pub const ALL_ORIGINS: &str = "https://api.allorigins.win/get?url={url}&disableCache=true";
    pub const CODE_TABS: &str = "https://api.codetabs.com/v1/proxy?quest={url}";
    pub const CORS_PROXY: &str = "https://corsproxy.io/?{url}";

    pub fn default_relays() -> Vec<RelayConfig> {
        vec![
            RelayConfig::new("allorigins", ALL_ORIGINS, RelayEnvelope::JsonContents),
            RelayConfig::new("codetabs", CODE_TABS, RelayEnvelope::RawText),
            RelayConfig::new("corsproxy", CORS_PROXY, RelayEnvelope::RawText),
        ]
    }
}

/// Default configuration values
pub mod defaults {
    pub const APP_DIR_NAME: &str = "site-inspector";
    pub const CONFIG_FILE_NAME: &str = "config.json";

    pub const ENV_PREFIX: &str = "SITE_INSPECTOR";
    pub const ENV_SEPARATOR: &str = "__";

    /// Per-attempt relay timeout
    pub const ATTEMPT_TIMEOUT_SECONDS: u64 = 10;

    pub const USER_AGENT: &str = "site-inspector/0.1 (+accessibility audit)";

    pub const MAX_REQUESTS_PER_SECOND: u32 = 5;

    pub const MAX_DETECTED_COLORS: usize = 15;

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = false;
    pub const LOG_FILE_NAME_PREFIX: &str = "site-inspector.log";

    pub const RECOMMENDATION_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
    pub const RECOMMENDATION_MODEL: &str = "gpt-4o-mini";
    pub const RECOMMENDATION_API_KEY_ENV: &str = "OPENAI_API_KEY";
    pub const RECOMMENDATION_TEMPERATURE: f32 = 0.7;
    pub const RECOMMENDATION_TIMEOUT_SECONDS: u64 = 60;
}
