use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use speech_pipeline::{FailureKind, RunFailure};

/// Envelope for successful API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
    }
}

/// API-level errors. Pipeline failures carry only the classified stage
/// and kind; anything internal is logged and reported generically.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Pipeline(#[from] RunFailure),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(failure) => match failure.kind {
                FailureKind::UnsupportedLanguage | FailureKind::TranscriptionRejected => {
                    StatusCode::BAD_REQUEST
                }
                FailureKind::TranscriptionUnavailable
                | FailureKind::TranslationUnavailable
                | FailureKind::SynthesisUnavailable => StatusCode::BAD_GATEWAY,
                FailureKind::KeyUnavailable
                | FailureKind::DecryptionFailed
                | FailureKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::BadRequest(message) => json!({
                "success": false,
                "error": { "message": message },
            }),
            ApiError::Pipeline(failure) => json!({
                "success": false,
                "error": {
                    "request_id": failure.request_id,
                    "stage": failure.stage,
                    "kind": failure.kind,
                },
            }),
            ApiError::Internal(detail) => {
                error!(detail = %detail, "internal server error");
                json!({
                    "success": false,
                    "error": { "message": "internal server error" },
                })
            }
        };
        (status, Json(body)).into_response()
    }
}
