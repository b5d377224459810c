//! Mapping of service errors to HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::error::{AlertError, MarketError};
use crate::metrics;

/// Error returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Market engine rejection.
    Market(MarketError),
    /// Alert registration rejection.
    Alert(AlertError),
    /// Request body is not valid JSON or has a malformed field.
    InvalidBody(String),
    /// Unknown resource outside the market engine.
    NotFound(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Market(MarketError::InvalidArgument(_))
            | ApiError::Market(MarketError::InvalidOption { .. })
            | ApiError::Alert(AlertError::InvalidArgument(_))
            | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Market(MarketError::NotFound { .. }) | ApiError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Market(MarketError::MarketClosed { .. })
            | ApiError::Market(MarketError::AlreadyResolved { .. }) => StatusCode::CONFLICT,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Market(e) => e.kind(),
            ApiError::Alert(_) | ApiError::InvalidBody(_) => "invalid_argument",
            ApiError::NotFound(_) => "not_found",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Market(e) => e.to_string(),
            ApiError::Alert(e) => e.to_string(),
            ApiError::InvalidBody(reason) => reason.clone(),
            ApiError::NotFound(what) => format!("{} not found", what),
        }
    }
}

impl From<MarketError> for ApiError {
    fn from(e: MarketError) -> Self {
        ApiError::Market(e)
    }
}

impl From<AlertError> for ApiError {
    fn from(e: AlertError) -> Self {
        ApiError::Alert(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.message();

        metrics::inc_requests_rejected(self.kind());
        warn!(status = status.as_u16(), reason = self.kind(), "Request rejected: {}", error);

        (status, Json(ErrorResponse { error })).into_response()
    }
}
