//! API route definitions

use axum::{
    body::Body,
    extract::{ConnectInfo, DefaultBodyLimit, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::{any::Any, net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info_span, warn};
use uuid::Uuid;

use super::handlers::{self, AppState};
use crate::{error::ServiceError, middleware::RateLimiter};

/// Create the application router
///
/// `/` and `/health` are public. The embedding routes sit behind the optional
/// rate limiter; task deliveries are never limited. Every route shares the
/// request body limit.
pub fn build_router(
    state: AppState,
    rate_limiter: Arc<RateLimiter>,
    body_limit_bytes: usize,
) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health));

    let embedding_routes = Router::new()
        .route("/embed", post(handlers::embed))
        .route("/embed/batch", post(handlers::embed_batch))
        .route("/similarity", post(handlers::similarity))
        .route("/article/embed", post(handlers::article_embed))
        .layer(axum::middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let task_routes = Router::new()
        .route("/tasks/embed", post(handlers::tasks_embed))
        .route("/tasks/embed-raw", post(handlers::tasks_embed_raw));

    public_routes
        .merge(embedding_routes)
        .merge(task_routes)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    info_span!(
                        "request",
                        request_id = %Uuid::new_v4(),
                        method = %req.method(),
                        uri = %req.uri(),
                    )
                }))
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(axum::middleware::map_response(method_not_allowed_envelope))
                .layer(DefaultBodyLimit::max(body_limit_bytes)),
        )
        .with_state(state)
}

async fn not_found() -> ServiceError {
    ServiceError::NotFound
}

/// Replace axum's empty 405 with the error envelope, keeping `Allow`
async fn method_not_allowed_envelope(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED
        || response.headers().contains_key(header::CONTENT_TYPE)
    {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut enveloped = ServiceError::MethodNotAllowed.into_response();
    if let Some(allow) = allow {
        enveloped.headers_mut().insert(header::ALLOW, allow);
    }
    enveloped
}

/// Rate limiting middleware
async fn rate_limit_middleware(
    State(rate_limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ServiceError> {
    if !rate_limiter.is_enabled() {
        return Ok(next.run(req).await);
    }

    let client_id = client_id(&req, rate_limiter.trusts_forwarded_for());
    if let Err(e) = rate_limiter.check_rate_limit(&client_id) {
        warn!("Rate limit exceeded for {}: {}", client_id, e);
        return Err(e.into());
    }

    Ok(next.run(req).await)
}

/// Client identity: the peer address, or the first `x-forwarded-for` hop
/// when the proxy in front is trusted
fn client_id(req: &Request<Body>, trust_forwarded_for: bool) -> String {
    req.headers()
        .get("x-forwarded-for")
        .filter(|_| trust_forwarded_for)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", message);

    ServiceError::Internal(message).into_response()
}
