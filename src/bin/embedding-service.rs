//! Embedding Service Server Binary
//!
//! Loads configuration, wires the Gemini provider, save client and rate
//! limiter into the router, and serves until Ctrl+C or SIGTERM.

use anyhow::Context;
use embedding_service::{
    api::{build_router, AppState},
    config::Config,
    embedding::{EmbeddingService, GeminiClient},
    middleware::{RateLimitConfig, RateLimiter},
    observability::init_tracing,
    save::SaveClient,
    shutdown::shutdown_signal,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load configuration (file: {})", config_path))?;

    init_tracing(&config.logging)?;

    info!("Starting {} v{}", config.app.name, config.app.version);
    info!("Configuration loaded and validated");

    if config.server.reload {
        warn!("RELOAD is set but hot reload is not supported; ignoring");
    }

    // Embedding provider
    let client = GeminiClient::new(config.embedding.clone())?;
    let service = EmbeddingService::new(Arc::new(client), config.embedding.default_dimensions);
    info!(
        "Embedding client initialized (model: {}, default dimensions: {})",
        service.model(),
        service.default_dimensions()
    );

    let save_client = Arc::new(SaveClient::new(&config.save)?);

    let rate_limiter = Arc::new(RateLimiter::new(
        RateLimitConfig::per_minute(config.server.rate_limit_per_minute)
            .with_forwarded_for(config.server.trust_forwarded_for),
    ));
    if rate_limiter.is_enabled() {
        rate_limiter.clone().start_cleanup_task();
        info!(
            "Rate limiter initialized: {} requests per minute",
            config.server.rate_limit_per_minute
        );
    } else {
        info!("Rate limiting disabled");
    }

    let body_limit_bytes = config.server.max_body_size_mb * 1024 * 1024;

    let app_state = AppState {
        service,
        save_client,
        app: Arc::new(config.app.clone()),
        max_batch_size: config.embedding.max_batch_size,
    };
    let app = build_router(app_state, rate_limiter, body_limit_bytes);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");

    Ok(())
}
