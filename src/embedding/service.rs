//! Stateless adapter turning validated requests into embedding results

use super::{EmbeddingProvider, EmbeddingResult, SimilarityResult};
use crate::error::{ProviderError, Result};
use crate::middleware::InputValidator;
use crate::vector;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Embedding operations over a provider, with optional normalization
#[derive(Clone)]
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    default_dimensions: usize,
}

impl EmbeddingService {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, default_dimensions: usize) -> Self {
        Self {
            provider,
            default_dimensions,
        }
    }

    /// Model identifier of the underlying provider
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn default_dimensions(&self) -> usize {
        self.default_dimensions
    }

    /// Embed one text.
    ///
    /// Fails with a validation error for blank text, and with a provider
    /// error when the call fails or returns a vector of the wrong length.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn embed_one(
        &self,
        text: &str,
        normalize: bool,
        dimensions: Option<usize>,
    ) -> Result<EmbeddingResult> {
        InputValidator::validate_text(text)?;

        let dimensions = dimensions.unwrap_or(self.default_dimensions);
        let embedding = self.provider.embed_single(text, dimensions).await?;

        self.shape(text.to_string(), embedding, normalize, dimensions)
    }

    /// Embed many texts with a single provider call; output order matches input order
    #[instrument(skip(self, texts), fields(count = texts.len()))]
    pub async fn embed_many(
        &self,
        texts: &[String],
        normalize: bool,
        dimensions: Option<usize>,
    ) -> Result<Vec<EmbeddingResult>> {
        InputValidator::validate_texts(texts)?;

        let dimensions = dimensions.unwrap_or(self.default_dimensions);
        let embeddings = self.provider.embed_batch(texts, dimensions).await?;

        if embeddings.len() != texts.len() {
            return Err(ProviderError::InvalidResponse(format!(
                "expected {} embeddings, received {}",
                texts.len(),
                embeddings.len()
            ))
            .into());
        }

        texts
            .iter()
            .zip(embeddings)
            .map(|(text, embedding)| self.shape(text.clone(), embedding, normalize, dimensions))
            .collect()
    }

    /// Cosine similarity of two texts embedded at the default dimensionality
    pub async fn similarity(
        &self,
        text1: &str,
        text2: &str,
        normalize: bool,
    ) -> Result<SimilarityResult> {
        let (first, second) = futures::future::try_join(
            self.embed_one(text1, normalize, None),
            self.embed_one(text2, normalize, None),
        )
        .await?;

        let similarity = vector::cosine_similarity(&first.embedding, &second.embedding)?;
        debug!("Similarity computed: {}", similarity);

        Ok(SimilarityResult {
            text1: first.text,
            text2: second.text,
            similarity,
            embedding1: first.embedding,
            embedding2: second.embedding,
        })
    }

    fn shape(
        &self,
        text: String,
        mut embedding: Vec<f32>,
        normalize: bool,
        dimensions: usize,
    ) -> Result<EmbeddingResult> {
        if embedding.len() != dimensions {
            return Err(ProviderError::UnexpectedDimension {
                expected: dimensions,
                actual: embedding.len(),
            }
            .into());
        }

        if normalize {
            vector::normalize_in_place(&mut embedding);
        }

        Ok(EmbeddingResult {
            text,
            dimension: embedding.len(),
            embedding,
            normalized: normalize,
            model: self.model().to_string(),
        })
    }
}
