use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Failures inside the screening pipeline.
///
/// Nodes convert these into the run's recorded error string, so the `Display`
/// text is what ends up in a failure report.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// Missing or blank required input. Fatal to the current node only.
    #[error("{0}")]
    Input(String),

    /// Model output held no recoverable JSON. Degrades to defaults, never surfaced.
    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A supported document that could not be decoded.
    #[error("could not read document: {0}")]
    Document(String),

    #[error("model invocation failed: {0}")]
    ModelInvocation(#[from] LlmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking work (document parsing, file writes) panicked or was cancelled.
    #[error("background task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, detail) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedFormat(_) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_FORMAT",
                self.to_string(),
            ),
        };

        let body = Json(json!({
            "detail": detail,
            "code": code,
        }));

        (status, body).into_response()
    }
}
