use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContestError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ContestError {
    fn into_response(self) -> Response {
        let status = match self {
            ContestError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ContestError::NotFound(_) => StatusCode::NOT_FOUND,
            ContestError::Conflict(_) => StatusCode::CONFLICT,
            ContestError::Database(_) | ContestError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Never leak database details to clients.
        let message = match &self {
            ContestError::Database(_) | ContestError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}
