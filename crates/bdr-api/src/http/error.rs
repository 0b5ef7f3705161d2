//! Application error type mapping to HTTP status codes and the error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use bdr_types::error::DeliveryError;

use super::response::ErrorResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// The request body could not be understood.
    Validation(String),
}

impl From<DeliveryError> for AppError {
    fn from(e: DeliveryError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let response = match self {
            AppError::Validation(message) => {
                ErrorResponse::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            }
        };

        tracing::warn!(
            request_id = %response.meta.request_id,
            status = response.status().as_u16(),
            error = %response.errors[0].message,
            "request failed"
        );
        response.into_response()
    }
}
