use crate::models::{Document, DocumentSnapshot, Summary, SummaryType};
use crate::services::workspace::UploadFile;
use crate::state::{ProcessingStatus, StoredSummary};
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::collections::BTreeMap;

pub async fn list_documents(State(state): State<AppState>) -> Json<DocumentSnapshot> {
    Json(state.workspace.documents().snapshot())
}

pub async fn refresh_documents(State(state): State<AppState>) -> Json<DocumentSnapshot> {
    Json(state.workspace.refresh().await)
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub uploaded: Vec<Document>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub message: String,
}

/// Upload every file part of a multipart form.
///
/// Each file is validated and uploaded on its own; one bad file does not
/// stop the rest.
pub async fn upload_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut uploaded = Vec::new();
    let mut errors = Vec::new();
    let mut failure_status = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid multipart body: {}", e)))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                tracing::error!(filename = %filename, error = %e, "Failed to read uploaded file");
                errors.push(format!("{}: Failed to read file", filename));
                failure_status = failure_status.or(Some(StatusCode::PAYLOAD_TOO_LARGE));
                // The rest of the stream is unusable once a field fails.
                break;
            }
        };

        match state
            .workspace
            .upload(UploadFile {
                filename: filename.clone(),
                content_type,
                bytes,
            })
            .await
        {
            Ok(document) => uploaded.push(document),
            Err(e) => {
                errors.push(format!("{}: {}", filename, e));
                failure_status = failure_status.or(Some(AppError::from(e).status_code()));
            }
        }
    }

    if uploaded.is_empty() && errors.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "No file found in upload form"
        )));
    }

    let (status_code, response) = if errors.is_empty() {
        let message = format!("{} file(s) uploaded successfully", uploaded.len());
        (
            StatusCode::CREATED,
            UploadResponse {
                status: "success",
                uploaded,
                errors,
                message,
            },
        )
    } else if !uploaded.is_empty() {
        let message = format!(
            "{} file(s) uploaded, {} failed",
            uploaded.len(),
            errors.len()
        );
        (
            StatusCode::OK,
            UploadResponse {
                status: "partial",
                uploaded,
                errors,
                message,
            },
        )
    } else {
        (
            failure_status.unwrap_or(StatusCode::BAD_REQUEST),
            UploadResponse {
                status: "error",
                uploaded,
                errors,
                message: "All uploads failed".to_string(),
            },
        )
    };

    Ok((status_code, Json(response)))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.workspace.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub summary_type: SummaryType,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub doc_id: String,
    pub summary_type: SummaryType,
    #[serde(flatten)]
    pub summary: Summary,
}

pub async fn summarize_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Option<Json<SummarizeRequest>>,
) -> Result<Json<SummaryResponse>, AppError> {
    let summary_type = request
        .map(|Json(r)| r.summary_type)
        .unwrap_or_default();

    let summary = state.workspace.summarize(&id, summary_type).await?;

    Ok(Json(SummaryResponse {
        doc_id: id,
        summary_type,
        summary,
    }))
}

#[derive(Debug, Serialize)]
pub struct StoredSummaryResponse {
    pub doc_id: String,
    #[serde(flatten)]
    pub summary: StoredSummary,
}

/// The last summary generated for a document.
pub async fn stored_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredSummaryResponse>, AppError> {
    let summary = state.workspace.summaries().get(&id).ok_or_else(|| {
        AppError::NotFound(anyhow::anyhow!("No summary stored for document {}", id))
    })?;
    Ok(Json(StoredSummaryResponse { doc_id: id, summary }))
}

pub async fn clear_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<serde_json::Value> {
    let cleared = state.workspace.summaries().clear(&id);
    Json(serde_json::json!({ "doc_id": id, "cleared": cleared }))
}

pub async fn processing_status(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, ProcessingStatus>> {
    Json(state.workspace.processing().snapshot())
}
