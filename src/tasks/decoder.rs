//! Ordered fallback decoder for raw task bodies
//!
//! Queues may deliver the task body base64-encoded or as plain JSON. The
//! decoder tries base64 first, then plain JSON, and otherwise keeps a short
//! excerpt of what arrived for the error response.

use super::EMBEDDING_TASK_TYPE;
use crate::api::models::ArticleEmbeddingRequest;
use crate::error::DecodeError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use tracing::{debug, warn};

/// Maximum number of characters of an undecodable body echoed back
pub const EXCERPT_CHARS: usize = 200;

/// Outcome of decoding a raw body
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedAs {
    Base64Json(Value),
    RawJson(Value),
    DecodeFailed { excerpt: String },
}

/// Decode a raw body: base64-wrapped JSON first, then plain JSON
pub fn decode_raw_body(body: &[u8]) -> DecodedAs {
    let trimmed = body.trim_ascii();

    if let Ok(decoded) = STANDARD.decode(trimmed) {
        match serde_json::from_slice::<Value>(&decoded) {
            Ok(value) => {
                debug!("Decoded task body as base64 JSON");
                return DecodedAs::Base64Json(value);
            }
            Err(e) => debug!("Base64 body is not JSON: {}", e),
        }
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value) => {
            debug!("Decoded task body as JSON");
            DecodedAs::RawJson(value)
        }
        Err(e) => {
            let excerpt: String = String::from_utf8_lossy(body).chars().take(EXCERPT_CHARS).collect();
            warn!("Unable to decode task body: {}", e);
            DecodedAs::DecodeFailed { excerpt }
        }
    }
}

impl DecodedAs {
    /// Check the task discriminator and extract the nested article request
    pub fn into_article_request(self) -> Result<ArticleEmbeddingRequest, DecodeError> {
        let mut value = match self {
            DecodedAs::Base64Json(value) | DecodedAs::RawJson(value) => value,
            DecodedAs::DecodeFailed { excerpt } => {
                return Err(DecodeError::Undecodable { excerpt });
            }
        };

        match value.get("task_type") {
            Some(Value::String(task_type)) if task_type == EMBEDDING_TASK_TYPE => {}
            Some(other) => {
                let actual = match other {
                    Value::String(s) => s.clone(),
                    v => v.to_string(),
                };
                return Err(DecodeError::InvalidTaskType {
                    expected: EMBEDDING_TASK_TYPE,
                    actual,
                });
            }
            None => return Err(DecodeError::MissingField("task_type")),
        }

        let request = value
            .get_mut("article_embedding_request")
            .map(Value::take)
            .filter(|v| !v.is_null())
            .ok_or(DecodeError::MissingField("article_embedding_request"))?;

        Ok(serde_json::from_value(request)?)
    }
}
