//! Input validation for embedding requests

use tracing::{debug, warn};

/// Smallest output dimensionality the provider accepts
pub const MIN_DIMENSIONS: usize = 128;

/// Largest output dimensionality the provider accepts
pub const MAX_DIMENSIONS: usize = 3072;

/// Maximum number of texts in a batch request
pub const MAX_BATCH_SIZE: usize = 100;

/// Input validator
pub struct InputValidator;

impl InputValidator {
    /// Validate text input
    pub fn validate_text(text: &str) -> Result<(), ValidationError> {
        if text.trim().is_empty() {
            warn!("Validation failed: empty text");
            return Err(ValidationError::EmptyInput);
        }

        debug!("Text validation passed");
        Ok(())
    }

    /// Validate every text of a batch, reporting the first blank one by index
    pub fn validate_texts(texts: &[String]) -> Result<(), ValidationError> {
        if texts.is_empty() {
            warn!("Validation failed: empty batch");
            return Err(ValidationError::EmptyBatch);
        }

        if let Some(index) = texts.iter().position(|t| t.trim().is_empty()) {
            warn!("Validation failed: empty text at index {}", index);
            return Err(ValidationError::EmptyInputAt { index });
        }

        Ok(())
    }

    /// Validate batch size
    pub fn validate_batch_size(size: usize, max_size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            warn!("Validation failed: empty batch");
            return Err(ValidationError::EmptyBatch);
        }

        if size > max_size {
            warn!("Validation failed: batch too large ({} > {})", size, max_size);
            return Err(ValidationError::BatchTooLarge { size, max_size });
        }

        debug!("Batch size validation passed");
        Ok(())
    }

    /// Validate requested output dimensionality
    pub fn validate_dimensions(dimensions: usize) -> Result<(), ValidationError> {
        if !(MIN_DIMENSIONS..=MAX_DIMENSIONS).contains(&dimensions) {
            warn!("Validation failed: dimensions out of range ({})", dimensions);
            return Err(ValidationError::DimensionsOutOfRange {
                value: dimensions,
                min: MIN_DIMENSIONS,
                max: MAX_DIMENSIONS,
            });
        }

        Ok(())
    }

    /// Validate article identifier
    pub fn validate_article_id(article_id: &str) -> Result<(), ValidationError> {
        if article_id.trim().is_empty() {
            warn!("Validation failed: empty article_id");
            return Err(ValidationError::EmptyArticleId);
        }

        Ok(())
    }
}

/// Validation errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("Text cannot be empty")]
    EmptyInput,

    #[error("Text at index {index} cannot be empty")]
    EmptyInputAt { index: usize },

    #[error("Texts list cannot be empty")]
    EmptyBatch,

    #[error("Batch size cannot exceed {max_size} texts (got {size})")]
    BatchTooLarge { size: usize, max_size: usize },

    #[error("dimensions must be between {min} and {max} (got {value})")]
    DimensionsOutOfRange { value: usize, min: usize, max: usize },

    #[error("article_id cannot be empty")]
    EmptyArticleId,

    #[error("Invalid task_type '{actual}', expected '{expected}'")]
    InvalidTaskType { expected: &'static str, actual: String },

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}
