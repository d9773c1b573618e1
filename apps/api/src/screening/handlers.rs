//! Axum route handlers for the Screening API.

use std::path::Path;

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::screening::documents::{extension_of, is_supported};
use crate::screening::pipeline::{ScreeningInput, ScreeningOutcome, UploadedResume};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub data: ScreeningOutcome,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze
///
/// Multipart form: `job_description` (required), plus `resume_text` and/or a
/// `resume_file` upload (.pdf, .docx, .txt). The file wins when both are sent.
/// Analysis failures still return 200 with a failure report in `data.final_report`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let input = read_form(multipart).await?;

    if input.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Job description is required".to_string(),
        ));
    }

    let has_text = input
        .resume_text
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    if !has_text && input.resume_file.is_none() {
        return Err(AppError::Validation(
            "Resume file or text is required".to_string(),
        ));
    }

    if let Some(upload) = &input.resume_file {
        let path = Path::new(&upload.file_name);
        if !is_supported(path) {
            let ext = extension_of(path)
                .map(|e| format!(".{e}"))
                .unwrap_or_else(|| upload.file_name.clone());
            return Err(AppError::UnsupportedFormat(ext));
        }
        info!(
            "Received resume upload {} ({} bytes)",
            upload.file_name,
            upload.bytes.len()
        );
    }

    let data = state.pipeline.process(input).await;

    Ok(Json(AnalyzeResponse {
        status: "success",
        message: "Resume analysis completed",
        data,
    }))
}

async fn read_form(mut multipart: Multipart) -> Result<ScreeningInput, AppError> {
    let mut input = ScreeningInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed form data: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed form data: {e}")))?;

        match name.as_str() {
            "job_description" => {
                input.job_description = String::from_utf8_lossy(&data).into_owned();
            }
            "resume_text" => {
                input.resume_text = Some(String::from_utf8_lossy(&data).into_owned());
            }
            "resume_file" => {
                // Browsers send an empty part when no file was picked.
                input.resume_file = file_name
                    .filter(|n| !n.trim().is_empty() && !data.is_empty())
                    .map(|file_name| UploadedResume {
                        file_name,
                        bytes: data,
                    });
            }
            other => {
                tracing::debug!("Ignoring unknown form field '{other}'");
            }
        }
    }

    Ok(input)
}
