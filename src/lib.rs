//! Embedding Service - text embeddings over HTTP, backed by Google Gemini
//!
//! This library exposes a small HTTP API that turns text into embedding
//! vectors, compares texts by cosine similarity and forwards article
//! embeddings to an external save endpoint. Task queue deliveries are
//! accepted as typed JSON or as raw (optionally base64-encoded) bodies.
//!
//! ## Features
//!
//! - **Gemini Provider**: single and batch embedding with configurable dimensionality
//! - **Normalization**: optional unit-length scaling of every vector
//! - **Article Ingestion**: embed-and-save with a content-derived idempotency key
//! - **Rate Limiting**: optional per-client fixed window on the embedding routes
//! - **Input Validation**: text, batch size and dimension bounds
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use embedding_service::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load("config.toml")?;
//!
//!     let client = GeminiClient::new(config.embedding.clone())?;
//!     let service = EmbeddingService::new(Arc::new(client), config.embedding.default_dimensions);
//!
//!     let result = service.embed_one("Rust is a systems language", true, None).await?;
//!     println!("{} values from {}", result.dimension, result.model);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod embedding;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod save;
pub mod shutdown;
pub mod tasks;
pub mod vector;

pub use config::Config;
pub use error::{Result, ServiceError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{build_router, AppState};
    pub use crate::config::Config;
    pub use crate::embedding::{
        EmbeddingProvider, EmbeddingResult, EmbeddingService, GeminiClient, SimilarityResult,
    };
    pub use crate::error::{Result, ServiceError};
    pub use crate::middleware::{InputValidator, RateLimitConfig, RateLimiter};
    pub use crate::save::{SaveClient, SaveEmbeddingPayload};
    pub use crate::vector::{cosine_similarity, normalize};
}
