//! Embedding generation via the Gemini API

pub mod client;
pub mod models;
pub mod service;

pub use client::GeminiClient;
pub use models::{EmbeddingResult, SimilarityResult};
pub use service::EmbeddingService;

use async_trait::async_trait;
use crate::error::Result;

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text at the given output dimensionality
    async fn embed_single(&self, text: &str, dimensions: usize) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts in one outbound call, in input order
    async fn embed_batch(&self, texts: &[String], dimensions: usize) -> Result<Vec<Vec<f32>>>;

    /// Model identifier reported alongside each embedding
    fn model(&self) -> &str;
}
