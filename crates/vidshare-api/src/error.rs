use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::response::ApiResponse;

/// Every way a handler can fail. Rendered as the response envelope with
/// `success = false` and `data = null`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Path identifier is not a valid UUID. HTTP 400.
    #[error("{0}")]
    InvalidIdentifier(String),

    /// Missing or malformed field. HTTP 400.
    #[error("{0}")]
    InvalidInput(String),

    /// Missing or invalid access token. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Requester does not own the record. HTTP 403.
    #[error("{0}")]
    Forbidden(String),

    /// Referenced record does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate playlist name or membership. HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// Media host returned nothing usable. HTTP 500.
    #[error("{0}")]
    UploadFailed(String),

    /// Media host did not confirm a delete. HTTP 500.
    #[error("{0}")]
    ExternalDeleteFailed(String),

    /// Store failure after validation passed. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidIdentifier(_) | ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UploadFailed(_)
            | ApiError::ExternalDeleteFailed(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Logs the store error and hides it from the caller.
    pub fn store(err: anyhow::Error) -> Self {
        error!("Store error: {:#}", err);
        ApiError::Internal("Something went wrong, please try again".into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ApiResponse {
            status_code: status.as_u16(),
            data: serde_json::Value::Null,
            message: self.to_string(),
            success: false,
        }
        .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::InvalidInput(format!("Malformed upload: {}", err.body_text()))
    }
}
