//! API error types and response formatting.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quiver_metadata::MetadataError;
use serde::Serialize;

/// API error type that converts to appropriate HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid bearer token.
    #[error("unauthorized")]
    Unauthorized,

    /// The request body could not be read as a metadata request.
    #[error("{0}")]
    BadRequest(String),

    /// Metadata generation failed.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// JSON error response body.
#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Metadata(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Metadata(err) => {
                match err {
                    MetadataError::UpstreamConfiguration(_) => {
                        tracing::error!(error = %err, "metadata generation is not configured")
                    }
                    _ => tracing::error!(error = %err, "metadata generation failed"),
                }
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
