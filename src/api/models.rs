//! Request and response schemas for the HTTP API

use crate::embedding::EmbeddingResult;
use crate::middleware::{InputValidator, ValidationError};
use serde::{Deserialize, Serialize};

fn default_normalize() -> bool {
    true
}

/// Body of `POST /embed`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    pub text: String,

    #[serde(default = "default_normalize")]
    pub normalize: bool,

    /// Output dimensionality; the configured default when absent
    #[serde(default)]
    pub dimensions: Option<usize>,
}

impl EmbeddingRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        InputValidator::validate_text(&self.text)?;
        if let Some(dimensions) = self.dimensions {
            InputValidator::validate_dimensions(dimensions)?;
        }
        Ok(())
    }
}

/// Body of `POST /article/embed`, also nested in task payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleEmbeddingRequest {
    pub article_id: String,

    pub text: String,

    #[serde(default = "default_normalize")]
    pub normalize: bool,

    #[serde(default)]
    pub dimensions: Option<usize>,
}

impl ArticleEmbeddingRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        InputValidator::validate_article_id(&self.article_id)?;
        InputValidator::validate_text(&self.text)?;
        if let Some(dimensions) = self.dimensions {
            InputValidator::validate_dimensions(dimensions)?;
        }
        Ok(())
    }
}

/// Body of `POST /embed/batch`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEmbeddingRequest {
    pub texts: Vec<String>,

    #[serde(default = "default_normalize")]
    pub normalize: bool,

    #[serde(default)]
    pub dimensions: Option<usize>,
}

impl BatchEmbeddingRequest {
    pub fn validate(&self, max_batch_size: usize) -> Result<(), ValidationError> {
        InputValidator::validate_batch_size(self.texts.len(), max_batch_size)?;
        if let Some(dimensions) = self.dimensions {
            InputValidator::validate_dimensions(dimensions)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEmbeddingResponse {
    pub embeddings: Vec<EmbeddingResult>,
    pub total_count: usize,
}

/// Body of `POST /similarity`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityRequest {
    pub text1: String,
    pub text2: String,

    #[serde(default = "default_normalize")]
    pub normalize: bool,
}

impl SimilarityRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        InputValidator::validate_texts(&[self.text1.clone(), self.text2.clone()])
    }
}

/// Reply of the article and task routes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleEmbeddingResponse {
    pub status: String,
    pub article_id: String,
}

impl ArticleEmbeddingResponse {
    pub fn success(article_id: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            article_id: article_id.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub version: String,
}

/// JSON error envelope returned for every failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub error_type: String,
}
