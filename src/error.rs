//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::model::InferenceError;
use crate::models::FieldError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Request body could not be read as JSON
    InvalidBody { status: StatusCode, message: String },

    // Validation errors
    ValidationError(Vec<FieldError>),

    // Model errors
    Inference(InferenceError),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, detail) = match self {
            AppError::InvalidBody { status, message } => (status, message, None),
            AppError::ValidationError(fields) => {
                tracing::debug!("Validation failed: {:?}", fields);
                (StatusCode::UNPROCESSABLE_ENTITY, "Validation failed".to_string(), Some(fields))
            }
            AppError::Inference(err) => {
                tracing::error!("Inference error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Model inference failed".to_string(), None)
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), None)
            }
        };

        let mut body = json!({
            "error": error_message,
            "status": status.as_u16()
        });
        if let Some(fields) = detail {
            body["detail"] = json!(fields);
        }

        (status, Json(body)).into_response()
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::Inference(err)
    }
}

impl From<Vec<FieldError>> for AppError {
    fn from(fields: Vec<FieldError>) -> Self {
        AppError::ValidationError(fields)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(err.to_string())
    }
}
