//! Logging and tracing setup

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` wins over the configured level
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize logging and tracing.
///
/// `format` is one of `json`, `compact` or `pretty`; anything else falls back
/// to `pretty`. Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(&config.level));

    match config.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_target(false).with_thread_ids(true))
            .try_init()?,
        "compact" => registry
            .with(fmt::layer().compact().with_target(false).with_thread_ids(true))
            .try_init()?,
        _ => registry
            .with(fmt::layer().with_target(false).with_thread_ids(true))
            .try_init()?,
    }

    Ok(())
}
