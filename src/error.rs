use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-scoped error taxonomy. Database faults are logged and surface as a
/// generic 500; everything else maps to a client-facing 4xx with its message.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            StoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            StoreError::InvalidArgument(msg) | StoreError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            StoreError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            StoreError::Db(err) => {
                error!(error = %err, "Request failed on a database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };

        (
            status,
            Json(json!({
                "error": message
            })),
        )
            .into_response()
    }
}
