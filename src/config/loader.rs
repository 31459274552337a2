//! Configuration loader with environment variable support

use super::Config;
use crate::error::Result;
use config::{Environment, File};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Prefix for nested overrides, e.g. `EMBEDDING_SERVICE__SERVER__PORT`
pub const ENV_PREFIX: &str = "EMBEDDING_SERVICE";

/// Flat environment names and the configuration keys they set
pub const ENV_KEYS: &[(&str, &str)] = &[
    ("GOOGLE_AI_API_KEY", "embedding.api_key"),
    ("EMBEDDING_MODEL", "embedding.model"),
    ("DEFAULT_DIMENSIONS", "embedding.default_dimensions"),
    ("EMBEDDING_API_BASE_URL", "embedding.api_base_url"),
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("RELOAD", "server.reload"),
    ("RATE_LIMIT_PER_MINUTE", "server.rate_limit_per_minute"),
    ("TRUST_FORWARDED_FOR", "server.trust_forwarded_for"),
    ("SAVE_EMBEDDING_API_ENDPOINT", "save.endpoint"),
    ("APP_NAME", "app.name"),
    ("APP_DESCRIPTION", "app.description"),
    ("APP_VERSION", "app.version"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

/// Load `.env`, then the optional TOML file, then the process environment
pub fn load_config_with_env<P: AsRef<Path>>(path: P) -> Result<Config> {
    if let Ok(env_file) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", env_file.display());
    }

    let vars: HashMap<String, String> = std::env::vars().collect();
    load_config_from(Some(path.as_ref()), vars)
}

/// Build configuration from an optional file and an explicit variable map.
///
/// Precedence, lowest first: serde defaults, file, prefixed nested
/// variables, flat variables from [`ENV_KEYS`]. Empty values are ignored.
pub fn load_config_from(path: Option<&Path>, vars: HashMap<String, String>) -> Result<Config> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(Some(vars.clone())),
    );

    for (var, key) in ENV_KEYS {
        let value = vars.get(*var).filter(|v| !v.trim().is_empty()).cloned();
        builder = builder.set_override_option(*key, value)?;
    }

    let cfg: Config = builder.build()?.try_deserialize()?;
    Ok(cfg)
}
