//! Error types for the embedding service

use thiserror::Error;

/// Result type alias for embedding service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Main error type for the embedding service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(#[from] crate::middleware::ValidationError),

    #[error("Failed to generate embedding: {0}")]
    Provider(#[from] ProviderError),

    #[error("Failed to save embedding: {0}")]
    Save(#[from] SaveError),

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("Embeddings must have the same dimension: {left} != {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("{0}")]
    RateLimited(#[from] crate::middleware::RateLimitError),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Not Found")]
    NotFound,

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable name of the error class, reported as `error_type` to clients
    pub fn error_type(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "ValidationError",
            ServiceError::Provider(_) => "ProviderError",
            ServiceError::Save(_) => "SaveError",
            ServiceError::Decode(_) => "DecodeError",
            ServiceError::DimensionMismatch { .. } => "DimensionMismatch",
            ServiceError::RateLimited(_) => "RateLimitExceeded",
            ServiceError::PayloadTooLarge(_) => "PayloadTooLarge",
            ServiceError::NotFound => "NotFound",
            ServiceError::MethodNotAllowed => "MethodNotAllowed",
            ServiceError::Config(_) | ServiceError::Internal(_) => "InternalServerError",
        }
    }
}

/// Errors raised by the embedding provider call
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider returned {actual} values, expected {expected}")]
    UnexpectedDimension { expected: usize, actual: usize },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Authentication failed")]
    AuthenticationFailed,
}

/// Errors raised while forwarding an embedding to the save endpoint
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("save endpoint is not configured")]
    NotConfigured,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("save endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Errors raised while decoding a task payload
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Unable to decode task payload as base64 JSON or JSON (received: '{excerpt}')")]
    Undecodable { excerpt: String },

    #[error("Task payload is missing field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid task_type '{actual}', expected '{expected}'")]
    InvalidTaskType { expected: &'static str, actual: String },

    #[error("Invalid article_embedding_request: {0}")]
    InvalidRequest(#[from] serde_json::Error),
}

impl From<config::ConfigError> for ServiceError {
    fn from(err: config::ConfigError) -> Self {
        ServiceError::Config(err.to_string())
    }
}
