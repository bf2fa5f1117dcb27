use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The provider answered but left a gap in the requested date range.
    #[error("Weather data unavailable: {0}")]
    DataUnavailable(String),

    /// Network failure, timeout, non-success status or unparseable body.
    #[error("Weather source unreachable: {0}")]
    SourceUnreachable(String),

    /// None of the weighted attributes were present for this day.
    #[error("Insufficient weather data to score {0}")]
    InsufficientData(NaiveDate),

    #[error("No candidate days could be scored")]
    NoCandidates,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// Whether the caller may retry the weather fetch that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::SourceUnreachable(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::DataUnavailable(_) | AppError::SourceUnreachable(_) => {
                tracing::error!("Weather source error: {}", self);
                (
                    StatusCode::BAD_GATEWAY,
                    "Weather forecast is currently unavailable".to_string(),
                )
            }
            AppError::InsufficientData(_) | AppError::NoCandidates => {
                tracing::warn!("Recommendation error: {}", self);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "No suitable days could be found".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}
