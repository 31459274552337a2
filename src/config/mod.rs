//! Configuration management for the embedding service

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::Path;

pub mod loader;
pub mod validation;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub save: SaveConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Service metadata reported by `/` and `/health`
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_description")]
    pub description: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

/// Configuration for the embedding provider
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// Google AI API key (secured)
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    pub api_key: Secret<String>,

    /// Base URL of the Gemini REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Embedding model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Output dimensionality used when a request does not specify one
    #[serde(default = "default_dimensions")]
    pub default_dimensions: usize,

    /// Maximum number of texts accepted by `/embed/batch`
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Configuration for the external save endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SaveConfig {
    /// Endpoint receiving computed embeddings; article routes fail without it
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Dev-server hot reload flag; accepted for compatibility, has no effect
    #[serde(default)]
    pub reload: bool,

    /// Requests per minute per client on the embedding routes (0 = unlimited).
    /// Task deliveries are never limited.
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: usize,

    /// Key rate limiting on `x-forwarded-for`; only behind a trusted proxy
    #[serde(default)]
    pub trust_forwarded_for: bool,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size")]
    pub max_body_size_mb: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: `json`, `compact` or `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_app_name() -> String { "Embedding Generator API".to_string() }
fn default_app_description() -> String {
    "Generate 768-dimensional embeddings using Google's Gemini model".to_string()
}
fn default_app_version() -> String { env!("CARGO_PKG_VERSION").to_string() }
fn default_api_base_url() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_model() -> String { "gemini-embedding-001".to_string() }
fn default_dimensions() -> usize { 768 }
fn default_max_batch_size() -> usize { 100 }
fn default_timeout() -> u64 { 30 }
fn default_server_host() -> String { "127.0.0.1".to_string() }
fn default_server_port() -> u16 { 8000 }
fn default_rate_limit_per_minute() -> usize { 0 }
fn default_max_body_size() -> usize { 10 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "pretty".to_string() }
fn empty_secret() -> Secret<String> { Secret::new(String::new()) }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            description: default_app_description(),
            version: default_app_version(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: empty_secret(),
            api_base_url: default_api_base_url(),
            model: default_model(),
            default_dimensions: default_dimensions(),
            max_batch_size: default_max_batch_size(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            reload: false,
            rate_limit_per_minute: default_rate_limit_per_minute(),
            trust_forwarded_for: false,
            max_body_size_mb: default_max_body_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from `.env`, an optional TOML file and the process environment
    pub fn load<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let config = loader::load_config_with_env(path)?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Validate this configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        validation::validate_config(self)
    }

    /// Defaults for every section, with the given API key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            app: AppConfig::default(),
            embedding: EmbeddingConfig {
                api_key: Secret::new(api_key.into()),
                ..EmbeddingConfig::default()
            },
            save: SaveConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Whether an API key is present
    pub fn has_api_key(&self) -> bool {
        !self.embedding.api_key.expose_secret().trim().is_empty()
    }
}

/// Custom deserializer for Secret<String>
fn deserialize_secret<'de, D>(deserializer: D) -> Result<Secret<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(Secret::new(s))
}
