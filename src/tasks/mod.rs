//! Payloads delivered by the external task queue

pub mod decoder;

pub use decoder::{decode_raw_body, DecodedAs};

use crate::api::models::ArticleEmbeddingRequest;
use crate::middleware::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The only task type this service handles
pub const EMBEDDING_TASK_TYPE: &str = "embedding_generation";

/// Strictly typed task body of `POST /tasks/embed`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingTask {
    pub task_type: String,

    /// Scheduling time, RFC 3339
    #[serde(default)]
    pub timestamp: Option<String>,

    pub article_embedding_request: ArticleEmbeddingRequest,
}

impl EmbeddingTask {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.task_type != EMBEDDING_TASK_TYPE {
            warn!("Rejecting task with type '{}'", self.task_type);
            return Err(ValidationError::InvalidTaskType {
                expected: EMBEDDING_TASK_TYPE,
                actual: self.task_type.clone(),
            });
        }
        self.article_embedding_request.validate()
    }
}

/// Log how long a task waited between scheduling and delivery
pub fn log_delivery_lag(timestamp: Option<&str>, now: DateTime<Utc>) {
    let Some(raw) = timestamp else {
        return;
    };

    match DateTime::parse_from_rfc3339(raw) {
        Ok(scheduled) => {
            let lag = now.signed_duration_since(scheduled.with_timezone(&Utc));
            debug!("Task delivered {} ms after scheduling", lag.num_milliseconds());
        }
        Err(e) => warn!("Ignoring unparsable task timestamp '{}': {}", raw, e),
    }
}
