//! Configuration validation

use super::*;
use crate::error::{Result, ServiceError};
use crate::middleware::validator::{MAX_BATCH_SIZE, MAX_DIMENSIONS, MIN_DIMENSIONS};

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_embedding_config(&config.embedding)?;
    validate_save_config(&config.save)?;
    validate_server_config(&config.server)?;
    Ok(())
}

fn validate_embedding_config(config: &EmbeddingConfig) -> Result<()> {
    if config.api_key.expose_secret().trim().is_empty() {
        return Err(ServiceError::Config(
            "Required environment variable GOOGLE_AI_API_KEY is not set".to_string(),
        ));
    }

    validate_url("Embedding API base URL", &config.api_base_url)?;

    if config.model.trim().is_empty() {
        return Err(ServiceError::Config("Embedding model cannot be empty".to_string()));
    }

    if !(MIN_DIMENSIONS..=MAX_DIMENSIONS).contains(&config.default_dimensions) {
        return Err(ServiceError::Config(format!(
            "Default dimensions must be between {} and {}",
            MIN_DIMENSIONS, MAX_DIMENSIONS
        )));
    }

    if config.max_batch_size == 0 || config.max_batch_size > MAX_BATCH_SIZE {
        return Err(ServiceError::Config(format!(
            "Max batch size must be between 1 and {}",
            MAX_BATCH_SIZE
        )));
    }

    validate_timeout("Embedding", config.timeout_secs)
}

fn validate_save_config(config: &SaveConfig) -> Result<()> {
    if let Some(endpoint) = &config.endpoint {
        validate_url("Save endpoint", endpoint)?;
    }

    validate_timeout("Save endpoint", config.timeout_secs)
}

fn validate_server_config(config: &ServerConfig) -> Result<()> {
    if config.port == 0 {
        return Err(ServiceError::Config(
            "Port must be between 1 and 65535".to_string(),
        ));
    }

    if config.host.trim().is_empty() {
        return Err(ServiceError::Config("Server host cannot be empty".to_string()));
    }

    if config.max_body_size_mb == 0 {
        return Err(ServiceError::Config(
            "Max body size must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_url(name: &str, url: &str) -> Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ServiceError::Config(format!(
            "{} must start with http:// or https://",
            name
        )));
    }
    Ok(())
}

fn validate_timeout(name: &str, timeout_secs: u64) -> Result<()> {
    if timeout_secs == 0 || timeout_secs > 300 {
        return Err(ServiceError::Config(format!(
            "{} timeout must be between 1 and 300 seconds",
            name
        )));
    }
    Ok(())
}
