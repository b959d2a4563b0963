use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid HTTP status code: {0}")]
pub struct InvalidStatusCode(pub u16);

/// Serializes as `{}`; the payload of toggles and deletes.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Empty {}

/// The one body shape every endpoint returns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T, message: impl Into<String>) -> Result<Self, InvalidStatusCode> {
        if !(100..=599).contains(&status_code) {
            return Err(InvalidStatusCode(status_code));
        }
        Ok(Self {
            status_code,
            data,
            message: message.into(),
            success: status_code < 400,
        })
    }

    /// 200 with the default message.
    pub fn success(data: T) -> Self {
        Self::ok(data, "Success")
    }

    /// 200 with the given payload.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            data,
            message: message.into(),
            success: true,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
