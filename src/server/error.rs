//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::YardError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not enough data: {0}")]
    InsufficientData(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<YardError> for ServerError {
    fn from(err: YardError) -> Self {
        match err {
            YardError::NotFound(what) => ServerError::NotFound(format!("{} not found", what)),
            e @ YardError::InsufficientTrainingData { .. } => {
                ServerError::InsufficientData(e.to_string())
            }
            YardError::InvalidNumericInput(msg) | YardError::Validation(msg) => {
                ServerError::BadRequest(msg)
            }
            YardError::Conflict(msg) => ServerError::Conflict(msg),
            YardError::Unauthorized(msg) => ServerError::Unauthorized(msg),
            e => ServerError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::Unauthorized(msg) => {
                tracing::debug!(detail = %msg, "Unauthorized request");
                (StatusCode::UNAUTHORIZED, "Authentication required".to_string())
            }
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ServerError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ServerError::InsufficientData(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
