use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use resumate_persist::AttachmentKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileUploadResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileInfoResponse {
    pub name: String,
    pub content_type: String,
}

/// Multipart body of an upload
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Thread id; a new one is generated when absent
    pub uuid: Option<String>,
}

struct UploadedFile {
    file_name: Option<String>,
    content_type: String,
    bytes: Vec<u8>,
}

/// Pull `file` and optional `uuid` out of the form
async fn read_form(mut multipart: Multipart, max_bytes: usize) -> ApiResult<(UploadedFile, Option<String>)> {
    let mut file = None;
    let mut thread_id = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name().unwrap_or("") {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;

                if bytes.len() > max_bytes {
                    return Err(ApiError::PayloadTooLarge(format!(
                        "File exceeds the {} byte limit",
                        max_bytes
                    )));
                }

                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "uuid" => {
                let value = field.text().await.map_err(multipart_error)?;
                thread_id = Some(value).filter(|v| !v.trim().is_empty());
            }
            _ => continue,
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("Missing file field".to_string()))?;
    Ok((file, thread_id))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(e.body_text())
    }
}

async fn upload(state: &AppState, kind: AttachmentKind, multipart: Multipart) -> ApiResult<Json<FileUploadResponse>> {
    let (file, thread_id) = read_form(multipart, state.config.upload.max_bytes).await?;

    state
        .uploads
        .upload(kind, thread_id, file.file_name, &file.content_type, file.bytes)
        .await
        .map_err(|e| match e {
            resumate_chat::ChatError::Upload(msg) => ApiError::Upload(msg),
            other => ApiError::Chat(other),
        })?;

    Ok(Json(FileUploadResponse {
        message: format!("{} uploaded successfully!", kind.label()),
    }))
}

async fn info(state: &AppState, kind: AttachmentKind, thread_id: &str) -> ApiResult<Json<FileInfoResponse>> {
    let record = state
        .uploads
        .get(kind, thread_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", kind.label())))?;

    Ok(Json(FileInfoResponse {
        name: record.file_name,
        content_type: record.mime_type,
    }))
}

async fn remove(state: &AppState, kind: AttachmentKind, thread_id: &str) -> ApiResult<Json<FileUploadResponse>> {
    let existed = state.uploads.delete(kind, thread_id).await?;
    tracing::info!(thread_id, kind = kind.label(), existed, "attachment deleted");

    Ok(Json(FileUploadResponse {
        message: format!("{} deleted successfully!", kind.label()),
    }))
}

/// Upload a resume for a thread
#[utoipa::path(
    post,
    path = "/api/resume/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Resume stored", body = FileUploadResponse),
        (status = 413, description = "File too large"),
        (status = 500, description = "Provider upload failed")
    ),
    security(("bearer" = [])),
    tag = "resume"
)]
pub async fn upload_resume(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<FileUploadResponse>> {
    upload(&state, AttachmentKind::Resume, multipart).await
}

/// Resume file information for a thread
#[utoipa::path(
    get,
    path = "/api/resume/{thread_id}",
    params(("thread_id" = String, Path, description = "Thread ID")),
    responses(
        (status = 200, description = "Resume info", body = FileInfoResponse),
        (status = 404, description = "Resume not found")
    ),
    security(("bearer" = [])),
    tag = "resume"
)]
pub async fn get_resume(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<FileInfoResponse>> {
    info(&state, AttachmentKind::Resume, &thread_id).await
}

/// Delete a thread's resume
#[utoipa::path(
    delete,
    path = "/api/resume/{thread_id}",
    params(("thread_id" = String, Path, description = "Thread ID")),
    responses(
        (status = 200, description = "Resume deleted", body = FileUploadResponse)
    ),
    security(("bearer" = [])),
    tag = "resume"
)]
pub async fn delete_resume(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<FileUploadResponse>> {
    remove(&state, AttachmentKind::Resume, &thread_id).await
}

/// Upload a job description for a thread
#[utoipa::path(
    post,
    path = "/api/job-description/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Job description stored", body = FileUploadResponse),
        (status = 413, description = "File too large"),
        (status = 500, description = "Provider upload failed")
    ),
    security(("bearer" = [])),
    tag = "job-description"
)]
pub async fn upload_job_description(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<FileUploadResponse>> {
    upload(&state, AttachmentKind::JobDescription, multipart).await
}

/// Job description file information for a thread
#[utoipa::path(
    get,
    path = "/api/job-description/{thread_id}",
    params(("thread_id" = String, Path, description = "Thread ID")),
    responses(
        (status = 200, description = "Job description info", body = FileInfoResponse),
        (status = 404, description = "Job description not found")
    ),
    security(("bearer" = [])),
    tag = "job-description"
)]
pub async fn get_job_description(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<FileInfoResponse>> {
    info(&state, AttachmentKind::JobDescription, &thread_id).await
}

/// Delete a thread's job description
#[utoipa::path(
    delete,
    path = "/api/job-description/{thread_id}",
    params(("thread_id" = String, Path, description = "Thread ID")),
    responses(
        (status = 200, description = "Job description deleted", body = FileUploadResponse)
    ),
    security(("bearer" = [])),
    tag = "job-description"
)]
pub async fn delete_job_description(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<FileUploadResponse>> {
    remove(&state, AttachmentKind::JobDescription, &thread_id).await
}
