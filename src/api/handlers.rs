//! API request handlers

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection},
        State,
    },
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

use super::models::{
    ArticleEmbeddingRequest, ArticleEmbeddingResponse, BatchEmbeddingRequest,
    BatchEmbeddingResponse, EmbeddingRequest, HealthResponse, SimilarityRequest,
};
use crate::{
    config::AppConfig,
    embedding::{EmbeddingResult, EmbeddingService, SimilarityResult},
    error::Result,
    save::{SaveClient, SaveEmbeddingPayload},
    tasks::{self, EmbeddingTask},
};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub service: EmbeddingService,
    pub save_client: Arc<SaveClient>,
    pub app: Arc<AppConfig>,
    pub max_batch_size: usize,
}

/// Service metadata and route listing
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": state.app.name,
        "description": state.app.description,
        "version": state.app.version,
        "endpoints": {
            "embed": "/embed",
            "embed_batch": "/embed/batch",
            "similarity": "/similarity",
            "article_embed": "/article/embed",
            "tasks_embed": "/tasks/embed",
            "tasks_embed_raw": "/tasks/embed-raw",
            "health": "/health"
        },
        "model": state.service.model(),
        "default_dimensions": state.service.default_dimensions(),
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model: state.service.model().to_string(),
        version: state.app.version.clone(),
    })
}

/// Embed a single text
pub async fn embed(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EmbeddingRequest>, JsonRejection>,
) -> Result<Json<EmbeddingResult>> {
    let Json(req) = payload?;
    req.validate()?;

    let result = state
        .service
        .embed_one(&req.text, req.normalize, req.dimensions)
        .await?;
    Ok(Json(result))
}

/// Embed up to `max_batch_size` texts in one provider call
pub async fn embed_batch(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BatchEmbeddingRequest>, JsonRejection>,
) -> Result<Json<BatchEmbeddingResponse>> {
    let Json(req) = payload?;
    req.validate(state.max_batch_size)?;

    let embeddings = state
        .service
        .embed_many(&req.texts, req.normalize, req.dimensions)
        .await?;
    Ok(Json(BatchEmbeddingResponse {
        total_count: embeddings.len(),
        embeddings,
    }))
}

pub async fn similarity(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SimilarityRequest>, JsonRejection>,
) -> Result<Json<SimilarityResult>> {
    let Json(req) = payload?;
    req.validate()?;

    let result = state
        .service
        .similarity(&req.text1, &req.text2, req.normalize)
        .await?;
    Ok(Json(result))
}

/// Embed an article and forward the vector to the save endpoint
pub async fn article_embed(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ArticleEmbeddingRequest>, JsonRejection>,
) -> Result<Json<ArticleEmbeddingResponse>> {
    let Json(req) = payload?;
    embed_and_save(&state, req).await.map(Json)
}

/// Typed task delivery
pub async fn tasks_embed(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EmbeddingTask>, JsonRejection>,
) -> Result<Json<ArticleEmbeddingResponse>> {
    let Json(task) = payload?;
    task.validate()?;
    tasks::log_delivery_lag(task.timestamp.as_deref(), Utc::now());

    embed_and_save(&state, task.article_embedding_request)
        .await
        .map(Json)
}

/// Task delivery whose body may be base64-encoded JSON or plain JSON
pub async fn tasks_embed_raw(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<ArticleEmbeddingResponse>> {
    let body = body?;
    let decoded = tasks::decode_raw_body(&body);

    let timestamp = match &decoded {
        tasks::DecodedAs::Base64Json(value) | tasks::DecodedAs::RawJson(value) => value
            .get("timestamp")
            .and_then(Value::as_str)
            .map(str::to_string),
        tasks::DecodedAs::DecodeFailed { .. } => None,
    };
    tasks::log_delivery_lag(timestamp.as_deref(), Utc::now());

    let req = decoded.into_article_request()?;
    embed_and_save(&state, req).await.map(Json)
}

#[instrument(skip(state, req), fields(article_id = %req.article_id))]
async fn embed_and_save(
    state: &AppState,
    req: ArticleEmbeddingRequest,
) -> Result<ArticleEmbeddingResponse> {
    req.validate()?;

    let result = state
        .service
        .embed_one(&req.text, req.normalize, req.dimensions)
        .await?;

    let payload = SaveEmbeddingPayload {
        article_id: req.article_id,
        dimension: result.dimension,
        normalized: result.normalized,
        model: result.model,
        embedding: result.embedding,
    };
    state.save_client.save(&payload).await?;

    info!("Embedding saved for article {}", payload.article_id);
    Ok(ArticleEmbeddingResponse::success(payload.article_id))
}
