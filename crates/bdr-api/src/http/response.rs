//! Error envelope for API responses.
//!
//! ```json
//! {
//!   "data": null,
//!   "meta": { "request_id": "...", "timestamp": "..." },
//!   "errors": [{ "code": "VALIDATION_ERROR", "message": "..." }]
//! }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

/// Envelope returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `null`; kept so clients can check a single shape.
    pub data: Option<()>,
    pub meta: ApiMeta,
    pub errors: Vec<ApiErrorDetail>,
    #[serde(skip)]
    status: StatusCode,
}

/// Metadata included in every envelope.
#[derive(Debug, Serialize)]
pub struct ApiMeta {
    /// Unique request identifier, also written to the log.
    pub request_id: String,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            data: None,
            meta: ApiMeta {
                request_id: Uuid::now_v7().to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
            errors: vec![ApiErrorDetail {
                code: code.to_string(),
                message: message.into(),
            }],
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let body = serde_json::to_string(&self).unwrap_or_else(|_| {
            r#"{"errors":[{"code":"SERIALIZATION_ERROR","message":"Failed to serialize response"}]}"#.to_string()
        });

        (
            self.status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
