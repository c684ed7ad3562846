/// Error handling for the reporting service
///
/// Responses use a `{"detail": "..."}` body, matching what the dashboard
/// clients of the original service already parse.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Result type alias for reporting handlers
pub type ReportResult<T> = Result<T, ReportError>;

/// Unified reporting error type
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Bad request (400) - missing filter or unparseable date
    #[error("{0}")]
    BadRequest(String),

    /// Not found (404) - unknown farm or farmer
    #[error("{0}")]
    NotFound(String),

    /// Database error (500)
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Error body shape
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ReportError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ReportError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ReportError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ReportError::BadRequest("Both start_date and end_date are required".to_string());
        assert_eq!(err.to_string(), "Both start_date and end_date are required");

        let err = ReportError::NotFound("Farm not found".to_string());
        assert_eq!(err.to_string(), "Farm not found");
    }
}
