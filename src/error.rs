// Service errors and their HTTP mapping. Every failure leaves as JSON `{"message": ...}`.

use axum::{
    Json,
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::SampleError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Empty, malformed, or incomplete ingest body.
    #[error("{0}")]
    InvalidBody(String),
    /// Body over the extractor's length limit.
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    NotFound(String),
    /// Detail is logged, never sent to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SampleError> for ApiError {
    fn from(e: SampleError) -> Self {
        ApiError::InvalidBody(e.to_string())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::InvalidBody(rejection.body_text())
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(format!("{:#}", e))
    }
}

/// Body for every non-2xx response.
pub fn message_body(message: &str) -> serde_json::Value {
    serde_json::json!({ "message": message })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::InvalidBody(m) | ApiError::PayloadTooLarge(m) | ApiError::NotFound(m) => {
                m.as_str()
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "Internal server error"
            }
        };
        (status, Json(message_body(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::InvalidBody("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::PayloadTooLarge("x".into()).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::from(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn sample_error_becomes_invalid_body() {
        let e = ApiError::from(SampleError::Empty);
        assert!(matches!(e, ApiError::InvalidBody(_)));
        assert!(e.to_string().contains("non-empty JSON object"));
    }
}
