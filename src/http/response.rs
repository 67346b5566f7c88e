//! Response shaping and error mapping.
//!
//! # Responsibilities
//! - Map handler failures to HTTP status codes and JSON bodies
//! - Attach `Retry-After` to rate-limit rejections
//! - Record server faults on the diagnostic channel

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::storage::LogError;

/// Successful `/login` response body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub id: String,
    pub timestamp: String,
}

/// Caller-visible failures of the ingestion endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("invalid or oversized JSON body")]
    InvalidJson,

    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("failed to persist record: {0}")]
    Persistence(#[from] LogError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidJson => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::MethodNotAllowed => {
                let mut response =
                    (status, Json(json!({"error": "method_not_allowed"}))).into_response();
                response
                    .headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static("POST"));
                response
            }
            ApiError::InvalidJson => (status, Json(json!({"error": "invalid_json"}))).into_response(),
            ApiError::RateLimited { retry_after_secs } => {
                let body = json!({
                    "error": "too_many_requests",
                    "retry_after_sec": retry_after_secs,
                });
                let mut response = (status, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                response
            }
            ApiError::Persistence(e) => {
                tracing::error!(error = %e, "Failed to append connection record");
                (status, Json(json!({"error": "internal_error"}))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let response = ApiError::RateLimited { retry_after_secs: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
        assert_eq!(
            body_json(response).await,
            json!({"error": "too_many_requests", "retry_after_sec": 42})
        );
    }

    #[tokio::test]
    async fn test_method_not_allowed_response() {
        let response = ApiError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
        assert_eq!(body_json(response).await, json!({"error": "method_not_allowed"}));
    }

    #[tokio::test]
    async fn test_persistence_response_hides_details() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/secret/path");
        let response = ApiError::Persistence(LogError::Io(io)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"error": "internal_error"}));
    }

    #[test]
    fn test_invalid_json_status() {
        assert_eq!(ApiError::InvalidJson.status(), StatusCode::BAD_REQUEST);
    }
}
