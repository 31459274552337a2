//! Forwarding of computed embeddings to the external save endpoint

use crate::config::SaveConfig;
use crate::error::{Result, SaveError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Header carrying the content-derived idempotency key
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Body sent to the save endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEmbeddingPayload {
    pub article_id: String,
    pub embedding: Vec<f32>,
    pub dimension: usize,
    pub normalized: bool,
    pub model: String,
}

impl SaveEmbeddingPayload {
    /// Hex SHA-256 over the article id, shape flags and embedding bytes.
    ///
    /// Redelivered tasks produce the same key, so the receiver can drop duplicates.
    pub fn idempotency_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.article_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.model.as_bytes());
        hasher.update((self.dimension as u64).to_le_bytes());
        hasher.update([u8::from(self.normalized)]);
        for value in &self.embedding {
            hasher.update(value.to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Client for the save endpoint. Makes one attempt per call.
pub struct SaveClient {
    endpoint: Option<String>,
    http_client: Client,
}

impl SaveClient {
    pub fn new(config: &SaveConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SaveError::Network)?;

        match &config.endpoint {
            Some(endpoint) => info!("Save endpoint configured: {}", endpoint),
            None => warn!("No save endpoint configured; article routes will fail"),
        }

        Ok(Self {
            endpoint: config.endpoint.clone(),
            http_client,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// POST the payload; any non-2xx response is a failure
    pub async fn save(&self, payload: &SaveEmbeddingPayload) -> Result<()> {
        let endpoint = self.endpoint.as_deref().ok_or(SaveError::NotConfigured)?;

        let response = self
            .http_client
            .post(endpoint)
            .header(IDEMPOTENCY_HEADER, payload.idempotency_key())
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!("Save request for article {} failed: {}", payload.article_id, e);
                SaveError::Network(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "Save endpoint rejected article {} with status {}: {}",
                payload.article_id, status, body
            );
            return Err(SaveError::Rejected {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        debug!("Saved embedding for article {}", payload.article_id);
        Ok(())
    }
}
