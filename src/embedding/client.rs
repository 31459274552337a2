//! Embedding client for the Gemini REST API

use super::{models::*, EmbeddingProvider};
use crate::config::EmbeddingConfig;
use crate::error::{ProviderError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Client for generating embeddings via the Gemini API
pub struct GeminiClient {
    config: EmbeddingConfig,
    http_client: Client,
}

impl GeminiClient {
    /// Create a new embedding client
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(ProviderError::NetworkError)?;

        info!("Initialized Gemini embedding client for model {}", config.model);

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Model name without a `models/` prefix
    fn api_model_name(&self) -> &str {
        self.config
            .model
            .strip_prefix("models/")
            .unwrap_or(&self.config.model)
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.api_model_name(),
            method
        )
    }

    /// Make a single API request; no retries
    async fn try_request<B, R>(&self, method: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!("Making Gemini {} request", method);

        let response = self
            .http_client
            .post(self.method_url(method))
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(ProviderError::NetworkError)?;

        let status = response.status();

        match status {
            s if s.is_success() => {
                let text = response.text().await.map_err(ProviderError::NetworkError)?;
                serde_json::from_str(&text).map_err(|e| {
                    error!("Failed to parse Gemini response: {}", e);
                    ProviderError::InvalidResponse(e.to_string()).into()
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!("Gemini authentication failed ({})", status);
                Err(ProviderError::AuthenticationFailed.into())
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Gemini rate limit exceeded");
                Err(ProviderError::RateLimitExceeded.into())
            }
            _ => {
                let error_text = response.text().await.unwrap_or_default();
                error!("Gemini request failed with status {}: {}", status, error_text);
                Err(ProviderError::ApiError {
                    status: status.as_u16(),
                    message: error_text,
                }
                .into())
            }
        }
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed_single(&self, text: &str, dimensions: usize) -> Result<Vec<f32>> {
        let request = EmbedContentRequest::new(self.api_model_name(), text, dimensions);
        let response: EmbedContentResponse = self.try_request("embedContent", &request).await?;

        debug!("Received embedding with {} values", response.embedding.values.len());
        Ok(response.embedding.values)
    }

    async fn embed_batch(&self, texts: &[String], dimensions: usize) -> Result<Vec<Vec<f32>>> {
        let request = BatchEmbedContentsRequest::new(self.api_model_name(), texts, dimensions);
        let response: BatchEmbedContentsResponse =
            self.try_request("batchEmbedContents", &request).await?;

        if response.embeddings.len() != texts.len() {
            return Err(ProviderError::InvalidResponse(format!(
                "expected {} embeddings, received {}",
                texts.len(),
                response.embeddings.len()
            ))
            .into());
        }

        debug!("Received {} embeddings", response.embeddings.len());
        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
