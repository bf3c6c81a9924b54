//! JSON error responses: `{"error": <message>, "code": <CODE>}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use taskpulse_core::TaskpulseError;
use taskpulse_tasks::TaskError;
use taskpulse_users::UserError;
use thiserror::Error;
use tracing::error;

/// Handler error. Wraps the shared error type so every crate's failures end
/// up with the same status mapping and `code` strings.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub TaskpulseError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self(TaskpulseError::Unauthorized(message.into()))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self(TaskpulseError::Validation(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TaskpulseError::Validation(_) => StatusCode::BAD_REQUEST,
            TaskpulseError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            TaskpulseError::NotFound { .. } => StatusCode::NOT_FOUND,
            TaskpulseError::Config(_)
            | TaskpulseError::Database(_)
            | TaskpulseError::Serialization(_)
            | TaskpulseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.0.code(), "request failed: {}", self.0);
        }
        let body = Json(json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
        }));
        (status, body).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        let inner = match e {
            UserError::Validation(msg) => TaskpulseError::Validation(msg),
            UserError::InvalidPin => TaskpulseError::Unauthorized(e.to_string()),
            UserError::NotFound(id) => TaskpulseError::not_found(format!("User {id}")),
            UserError::Database(db) => TaskpulseError::Database(db.to_string()),
        };
        Self(inner)
    }
}

impl From<TaskError> for ApiError {
    fn from(e: TaskError) -> Self {
        let inner = match e {
            TaskError::Validation(msg) => TaskpulseError::Validation(msg),
            TaskError::NotFound(id) => TaskpulseError::not_found(format!("Task {id}")),
            // The caller presented an identity that does not exist.
            TaskError::UnknownOwner(_) => TaskpulseError::Unauthorized(e.to_string()),
            TaskError::Database(db) => TaskpulseError::Database(db.to_string()),
        };
        Self(inner)
    }
}
