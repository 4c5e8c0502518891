use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::error::Category;
use thiserror::Error;

use super::models::ErrorResponse;

/// Rejections of the request itself. Handler failures never surface here;
/// they travel inside the result envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),
    #[error("request body is not a lifecycle event: {0}")]
    InvalidEvent(String),
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("event exceeds limit of {0} bytes")]
    PayloadTooLarge(usize),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedJson(_) | ApiError::InvalidEvent(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MalformedJson(_) => "MALFORMED_JSON",
            ApiError::InvalidEvent(_) => "INVALID_EVENT",
            ApiError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => ApiError::InvalidEvent(err.to_string()),
            Category::Io | Category::Syntax | Category::Eof => ApiError::MalformedJson(err.to_string()),
        }
    }
}
