use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::auth::AuthUser;
use crate::storage::models::{FileRecord, FileType};
use crate::workflow::staging::StagedFile;
use crate::workflow::{FileChanges, NewFile};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub byte_size: u64,
    pub category_id: Option<String>,
    pub cloud_url: String,
    pub created_at: String,
    pub description: Option<String>,
    pub file_name: String,
    pub file_size: String,
    pub file_type: FileType,
    pub folder_id: Option<String>,
    pub id: String,
    pub mime_type: String,
    pub updated_at: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateFileResponse {
    pub message: String,
    pub id: String,
    pub file_name: String,
    #[serde(rename = "cloudUrl")]
    pub cloud_url: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateFileResponse {
    pub message: String,
    pub file: FileResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Multipart fields shared by create and update.
#[derive(Debug, Default)]
struct UploadForm {
    staged: Option<StagedFile>,
    file_name: Option<String>,
    file_size: Option<String>,
    folder_id: Option<String>,
    category_id: Option<String>,
    description: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    multipart: Multipart,
) -> Result<Json<JSend<CreateFileResponse>>, ApiError> {
    let form = read_upload_form(&state, multipart).await?;

    let file = state
        .files
        .create(
            &claims.sub,
            NewFile {
                staged: form.staged,
                file_name: form.file_name,
                file_size: form.file_size,
                folder_id: form.folder_id,
                category_id: form.category_id,
                description: form.description,
            },
        )
        .await?;

    Ok(JSend::success(CreateFileResponse {
        message: "File created Successfully".to_string(),
        id: file.id,
        file_name: file.file_name,
        cloud_url: file.cloud_url,
    }))
}

pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
) -> Result<Json<JSend<Vec<FileResponse>>>, ApiError> {
    let files = state.files.list()?;
    Ok(JSend::success(files.iter().map(file_to_response).collect()))
}

/// Stream a file's bytes with its name as the suggested download name.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::bad_request("File ID is required"));
    }

    let content = state.files.fetch(&id).await?;
    let file = content.file;

    let mut response = (StatusCode::OK, content.data).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        file.mime_type
            .parse()
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );

    let filename = file.file_name.replace('"', "'");
    if let Ok(value) = format!("attachment; filename=\"{filename}\"").parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}

pub async fn update_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<JSend<UpdateFileResponse>>, ApiError> {
    let form = read_upload_form(&state, multipart).await?;

    let file = state
        .files
        .update(
            &claims.sub,
            &id,
            FileChanges {
                staged: form.staged,
                file_name: form.file_name,
                file_size: form.file_size,
                folder_id: form.folder_id,
                category_id: form.category_id,
                description: form.description,
            },
        )
        .await?;

    Ok(JSend::success(UpdateFileResponse {
        message: "File updated successfully".to_string(),
        file: file_to_response(&file),
    }))
}

pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<JSend<MessageResponse>>, ApiError> {
    state.files.delete(&claims.sub, &id).await?;

    Ok(JSend::success(MessageResponse {
        message: "File deleted successfully".to_string(),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Read the multipart body, staging the `file` part on disk as it arrives.
async fn read_upload_form(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let client_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .filter(|s| !s.trim().is_empty());

                let mut writer = state
                    .staging
                    .create(
                        client_name.clone(),
                        field.content_type().map(|s| s.to_string()),
                    )
                    .await
                    .map_err(|e| ApiError::internal(format!("Failed to stage upload: {e}")))?;

                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?
                {
                    if writer.len() + chunk.len() as u64 > state.config.max_upload_size {
                        return Err(ApiError::payload_too_large(format!(
                            "File exceeds maximum upload size of {} bytes",
                            state.config.max_upload_size
                        )));
                    }
                    writer
                        .write_chunk(&chunk)
                        .await
                        .map_err(|e| ApiError::internal(format!("Failed to stage upload: {e}")))?;
                }

                // A form with no file chosen still sends an empty, unnamed part.
                // Dropping the writer removes its staged copy.
                if client_name.is_none() && writer.is_empty() {
                    continue;
                }

                form.staged = Some(
                    writer
                        .finish()
                        .await
                        .map_err(|e| ApiError::internal(format!("Failed to stage upload: {e}")))?,
                );
            }
            "file_name" | "file_size" | "folder_id" | "category_id" | "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid {field_name}: {e}")))?;

                let slot = match field_name.as_str() {
                    "file_name" => &mut form.file_name,
                    "file_size" => &mut form.file_size,
                    "folder_id" => &mut form.folder_id,
                    "category_id" => &mut form.category_id,
                    _ => &mut form.description,
                };
                *slot = Some(text);
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    Ok(form)
}

pub(crate) fn file_to_response(file: &FileRecord) -> FileResponse {
    FileResponse {
        byte_size: file.byte_size,
        category_id: file.category_id.clone(),
        cloud_url: file.cloud_url.clone(),
        created_at: file.created_at.to_rfc3339(),
        description: file.description.clone(),
        file_name: file.file_name.clone(),
        file_size: file.file_size.clone(),
        file_type: file.file_type,
        folder_id: file.folder_id.clone(),
        id: file.id.clone(),
        mime_type: file.mime_type.clone(),
        updated_at: file.updated_at.to_rfc3339(),
        user_id: file.user_id.clone(),
    }
}
