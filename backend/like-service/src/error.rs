/// Error types for like-service
///
/// Store errors are surfaced to HTTP callers unchanged; this module only
/// decides the status code and the JSON body.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use like_schema::ErrorBody;
use thiserror::Error;

use crate::repository::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate like. Reported as 400 to match the published API.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            // A valid token whose subject is not a registered user
            err @ StoreError::UnknownUser(_) => AppError::Unauthorized(err.to_string()),
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        HttpResponse::build(status).json(ErrorBody {
            error: self.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Result type for like-service handlers
pub type Result<T> = std::result::Result<T, AppError>;
