use crate::response::ApiResponse;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatmem_core::MemoryServiceError;

/// Failures returned to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized: Invalid API Key")]
    Unauthorized,
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Not Found")]
    NotFound,
    /// Memory service failure; only its fixed message is exposed.
    #[error(transparent)]
    Processing(#[from] MemoryServiceError),
}

impl ApiError {
    /// Error for a required body field that is absent or empty.
    pub fn missing_field(field: &str) -> Self {
        ApiError::BadRequest(format!("\"{field}\" is required"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::Processing(err) => ApiResponse::error(err.to_string()),
            other => ApiResponse::message(other.to_string()),
        };
        (self.status(), Json(body)).into_response()
    }
}
