//! Router tests for the embedding service
//!
//! The Gemini provider is replaced by a deterministic in-process provider and
//! the save endpoint by a mockito server.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use embedding_service::{
    api::{build_router, AppState},
    config::{AppConfig, SaveConfig},
    embedding::{EmbeddingProvider, EmbeddingService},
    error::{ProviderError, Result},
    middleware::{RateLimitConfig, RateLimiter},
    save::{SaveClient, IDEMPOTENCY_HEADER},
};
use mockito::Matcher;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct FakeProvider {
    fail: bool,
}

fn fake_vector(text: &str, dimensions: usize) -> Vec<f32> {
    let bytes = text.as_bytes();
    (0..dimensions)
        .map(|i| ((bytes[i % bytes.len()] as usize * 31 + i) % 97) as f32 * 0.1 + 0.05)
        .collect()
}

#[async_trait]
impl EmbeddingProvider for FakeProvider {
    async fn embed_single(&self, text: &str, dimensions: usize) -> Result<Vec<f32>> {
        if self.fail {
            return Err(ProviderError::ApiError {
                status: 400,
                message: "API key not valid".to_string(),
            }
            .into());
        }
        Ok(fake_vector(text, dimensions))
    }

    async fn embed_batch(&self, texts: &[String], dimensions: usize) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| fake_vector(t, dimensions)).collect())
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

#[derive(Default)]
struct TestApp {
    save_endpoint: Option<String>,
    rate_limit: usize,
    fail_provider: bool,
    body_limit: Option<usize>,
}

impl TestApp {
    fn build(self) -> Router {
        let provider = Arc::new(FakeProvider {
            fail: self.fail_provider,
        });
        let save_client = SaveClient::new(&SaveConfig {
            endpoint: self.save_endpoint,
            timeout_secs: 5,
        })
        .unwrap();

        let state = AppState {
            service: EmbeddingService::new(provider, 768),
            save_client: Arc::new(save_client),
            app: Arc::new(AppConfig::default()),
            max_batch_size: 100,
        };
        let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig::per_minute(
            self.rate_limit,
        )));

        build_router(
            state,
            rate_limiter,
            self.body_limit.unwrap_or(10 * 1024 * 1024),
        )
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_raw(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn norm(values: &Value) -> f64 {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap().powi(2))
        .sum::<f64>()
        .sqrt()
}

fn task_body() -> Value {
    json!({
        "task_type": "embedding_generation",
        "timestamp": "2025-03-01T12:00:00Z",
        "article_embedding_request": {
            "article_id": "a1",
            "text": "Rust ownership explained",
            "normalize": true
        }
    })
}

#[tokio::test]
async fn test_health_and_root() {
    let (status, body) = send(TestApp::default().build(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "fake-model");

    let (status, body) = send(TestApp::default().build(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Embedding Generator API");
    assert_eq!(body["default_dimensions"], 768);
    assert_eq!(body["endpoints"]["embed"], "/embed");
}

#[tokio::test]
async fn test_embed_defaults() {
    let app = TestApp::default().build();
    let (status, body) = send(app, post_json("/embed", json!({ "text": "hello world" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "hello world");
    assert_eq!(body["dimension"], 768);
    assert_eq!(body["normalized"], true);
    assert_eq!(body["model"], "fake-model");
    assert_eq!(body["embedding"].as_array().unwrap().len(), 768);
    assert!((norm(&body["embedding"]) - 1.0).abs() < 1e-4);
}

#[tokio::test]
async fn test_embed_without_normalization() {
    let app = TestApp::default().build();
    let (status, body) = send(
        app,
        post_json(
            "/embed",
            json!({ "text": "hello", "normalize": false, "dimensions": 256 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dimension"], 256);
    assert_eq!(body["normalized"], false);
    let first = body["embedding"][0].as_f64().unwrap() as f32;
    assert_eq!(first, fake_vector("hello", 256)[0]);
}

#[tokio::test]
async fn test_embed_validation_errors() {
    let cases = [
        json!({ "text": "hello", "dimensions": 50 }),
        json!({ "text": "hello", "dimensions": 4096 }),
        json!({ "text": "   " }),
        json!({ "normalize": true }),
    ];

    for case in cases {
        let (status, body) = send(TestApp::default().build(), post_json("/embed", case)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_type"], "ValidationError");
        assert!(body["detail"].is_string());
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/embed")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"text\": "))
        .unwrap();

    let (status, body) = send(TestApp::default().build(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "ValidationError");
}

#[tokio::test]
async fn test_provider_failure_is_server_error() {
    let app = TestApp {
        fail_provider: true,
        ..TestApp::default()
    }
    .build();

    let (status, body) = send(app, post_json("/embed", json!({ "text": "hello" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_type"], "ProviderError");
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Failed to generate embedding"));
}

#[tokio::test]
async fn test_embed_batch_ordered() {
    let texts = ["one", "two", "three"];
    let app = TestApp::default().build();
    let (status, body) = send(
        app,
        post_json(
            "/embed/batch",
            json!({ "texts": texts, "dimensions": 128 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 3);
    for (i, text) in texts.iter().enumerate() {
        assert_eq!(body["embeddings"][i]["text"], *text);
        assert_eq!(body["embeddings"][i]["dimension"], 128);
    }
}

#[tokio::test]
async fn test_embed_batch_limits() {
    let too_many: Vec<String> = (0..101).map(|i| format!("text {}", i)).collect();
    let (status, body) = send(
        TestApp::default().build(),
        post_json("/embed/batch", json!({ "texts": too_many })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "ValidationError");

    let (status, body) = send(
        TestApp::default().build(),
        post_json("/embed/batch", json!({ "texts": ["ok", ""] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("index 1"));
}

#[tokio::test]
async fn test_similarity_of_identical_texts() {
    let (status, body) = send(
        TestApp::default().build(),
        post_json(
            "/similarity",
            json!({ "text1": "the same text", "text2": "the same text" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!((body["similarity"].as_f64().unwrap() - 1.0).abs() < 1e-4);
    assert_eq!(body["embedding1"].as_array().unwrap().len(), 768);
}

#[tokio::test]
async fn test_article_embed_forwards_to_save_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/save")
        .match_header(IDEMPOTENCY_HEADER, Matcher::Regex("^[0-9a-f]{64}$".to_string()))
        .match_body(Matcher::PartialJson(json!({
            "article_id": "a1",
            "dimension": 768,
            "normalized": true,
            "model": "fake-model"
        })))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let app = TestApp {
        save_endpoint: Some(format!("{}/save", server.url())),
        ..TestApp::default()
    }
    .build();

    let (status, body) = send(
        app,
        post_json(
            "/article/embed",
            json!({ "article_id": "a1", "text": "Rust ownership explained" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "article_id": "a1" }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_article_embed_save_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/save")
        .with_status(500)
        .with_body("database unavailable")
        .create_async()
        .await;

    let app = TestApp {
        save_endpoint: Some(format!("{}/save", server.url())),
        ..TestApp::default()
    }
    .build();

    let (status, body) = send(
        app,
        post_json("/article/embed", json!({ "article_id": "a1", "text": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_type"], "SaveError");
}

#[tokio::test]
async fn test_article_embed_without_save_endpoint() {
    let (status, body) = send(
        TestApp::default().build(),
        post_json("/article/embed", json!({ "article_id": "a1", "text": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_type"], "SaveError");
}

#[tokio::test]
async fn test_article_embed_requires_id() {
    let (status, body) = send(
        TestApp::default().build(),
        post_json("/article/embed", json!({ "article_id": "", "text": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "ValidationError");
}

#[tokio::test]
async fn test_typed_task() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/save")
        .match_body(Matcher::PartialJson(json!({ "article_id": "a1" })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let app = TestApp {
        save_endpoint: Some(format!("{}/save", server.url())),
        ..TestApp::default()
    }
    .build();

    let (status, body) = send(app, post_json("/tasks/embed", task_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["article_id"], "a1");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_typed_task_wrong_type_skips_save() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/save")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let app = TestApp {
        save_endpoint: Some(format!("{}/save", server.url())),
        ..TestApp::default()
    }
    .build();

    let mut task = task_body();
    task["task_type"] = json!("reindex");

    let (status, body) = send(app, post_json("/tasks/embed", task)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "ValidationError");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_raw_task_base64_and_plain() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/save")
        .match_body(Matcher::PartialJson(json!({ "article_id": "a1" })))
        .with_status(200)
        .expect(2)
        .create_async()
        .await;
    let endpoint = format!("{}/save", server.url());

    let encoded = STANDARD.encode(task_body().to_string());
    let app = TestApp {
        save_endpoint: Some(endpoint.clone()),
        ..TestApp::default()
    }
    .build();
    let (status, body) = send(app, post_raw("/tasks/embed-raw", encoded)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "article_id": "a1" }));

    let app = TestApp {
        save_endpoint: Some(endpoint),
        ..TestApp::default()
    }
    .build();
    let (status, _) = send(app, post_raw("/tasks/embed-raw", task_body().to_string())).await;
    assert_eq!(status, StatusCode::OK);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_raw_task_undecodable() {
    let (status, body) = send(
        TestApp::default().build(),
        post_raw("/tasks/embed-raw", "definitely not a task"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "DecodeError");
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("definitely not a task"));
}

#[tokio::test]
async fn test_raw_task_missing_request() {
    let body = json!({ "task_type": "embedding_generation" }).to_string();
    let (status, body) = send(
        TestApp::default().build(),
        post_raw("/tasks/embed-raw", body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "DecodeError");
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("article_embedding_request"));
}

#[tokio::test]
async fn test_rate_limit_applies_to_post_routes() {
    let app = TestApp {
        rate_limit: 2,
        ..TestApp::default()
    }
    .build();

    for _ in 0..2 {
        let (status, _) = send(app.clone(), post_json("/embed", json!({ "text": "hi" }))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(app.clone(), post_json("/embed", json!({ "text": "hi" }))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error_type"], "RateLimitExceeded");

    let (status, _) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_ignores_forwarded_for_by_default() {
    let app = TestApp {
        rate_limit: 2,
        ..TestApp::default()
    }
    .build();

    let mut statuses = Vec::new();
    for i in 0..4 {
        let mut request = post_json("/embed", json!({ "text": "hi" }));
        request
            .headers_mut()
            .insert("x-forwarded-for", format!("10.0.0.{}", i).parse().unwrap());
        let (status, _) = send(app.clone(), request).await;
        statuses.push(status);
    }

    assert_eq!(
        statuses,
        vec![
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS
        ]
    );
}

#[tokio::test]
async fn test_task_routes_are_not_rate_limited() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/save")
        .with_status(200)
        .expect(4)
        .create_async()
        .await;

    let app = TestApp {
        save_endpoint: Some(format!("{}/save", server.url())),
        rate_limit: 1,
        ..TestApp::default()
    }
    .build();

    for _ in 0..2 {
        let (status, _) = send(app.clone(), post_json("/tasks/embed", task_body())).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(
            app.clone(),
            post_raw("/tasks/embed-raw", task_body().to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_rate_limit_disabled_by_default() {
    let app = TestApp::default().build();
    for _ in 0..5 {
        let (status, _) = send(app.clone(), post_json("/embed", json!({ "text": "hi" }))).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_oversized_body_with_content_length() {
    let text = "x".repeat(500);
    let body = json!({ "text": text }).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/embed")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let app = TestApp {
        body_limit: Some(64),
        ..TestApp::default()
    }
    .build();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error_type"], "PayloadTooLarge");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_oversized_chunked_bodies() {
    let chunks = || {
        let chunk = Bytes::from(vec![b' '; 100]);
        futures::stream::iter(vec![
            Ok::<_, std::io::Error>(chunk.clone()),
            Ok(chunk.clone()),
            Ok(chunk),
        ])
    };

    let json_request = Request::builder()
        .method("POST")
        .uri("/embed")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from_stream(chunks()))
        .unwrap();
    let raw_request = Request::builder()
        .method("POST")
        .uri("/tasks/embed-raw")
        .body(Body::from_stream(chunks()))
        .unwrap();

    for request in [json_request, raw_request] {
        let app = TestApp {
            body_limit: Some(64),
            ..TestApp::default()
        }
        .build();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error_type"], "PayloadTooLarge");
    }
}

#[tokio::test]
async fn test_unknown_path_returns_envelope() {
    let (status, body) = send(TestApp::default().build(), get("/items/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Not Found", "error_type": "NotFound" }));
}

#[tokio::test]
async fn test_wrong_method_returns_envelope() {
    let app = TestApp::default().build();
    let response = app.oneshot(get("/embed")).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(response.headers().contains_key(header::ALLOW));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error_type"], "MethodNotAllowed");
}

#[tokio::test]
async fn test_similarity_rejects_blank_text() {
    let app = TestApp {
        fail_provider: true,
        ..TestApp::default()
    }
    .build();

    let (status, body) = send(
        app,
        post_json("/similarity", json!({ "text1": "hello", "text2": "  " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "ValidationError");
    assert!(body["detail"].as_str().unwrap().contains("index 1"));
}
