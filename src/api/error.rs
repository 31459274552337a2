//! Mapping of service errors onto HTTP responses

use super::models::ErrorResponse;
use crate::error::{ProviderError, SaveError, ServiceError};
use crate::middleware::ValidationError;
use axum::{
    extract::rejection::{BytesRejection, JsonRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::Decode(_) => StatusCode::BAD_REQUEST,
            ServiceError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServiceError::Provider(_)
            | ServiceError::Save(_)
            | ServiceError::DimensionMismatch { .. }
            | ServiceError::Config(_)
            | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal failures are not echoed verbatim.
    fn detail(&self) -> String {
        match self {
            ServiceError::Config(_) | ServiceError::Internal(_) => {
                "Internal server error".to_string()
            }
            ServiceError::Provider(ProviderError::NetworkError(_)) => {
                "Failed to generate embedding: provider unreachable".to_string()
            }
            ServiceError::Save(SaveError::Network(_)) => {
                "Failed to save embedding: save endpoint unreachable".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let retry_after = match &self {
            ServiceError::RateLimited(crate::middleware::RateLimitError::LimitExceeded {
                retry_after,
                ..
            }) => Some(retry_after.as_secs().max(1)),
            _ => None,
        };

        let body = Json(ErrorResponse {
            detail: self.detail(),
            error_type: self.error_type().to_string(),
        });

        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// Over-limit bodies surface from the extractors as 413 rejections,
/// whether or not the client declared a Content-Length.
fn rejection_to_error(status: StatusCode, body_text: String) -> ServiceError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::PayloadTooLarge(body_text)
    } else {
        ValidationError::InvalidBody(body_text).into()
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        rejection_to_error(rejection.status(), rejection.body_text())
    }
}

impl From<BytesRejection> for ServiceError {
    fn from(rejection: BytesRejection) -> Self {
        rejection_to_error(rejection.status(), rejection.body_text())
    }
}
