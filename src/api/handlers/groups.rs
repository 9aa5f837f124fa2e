//! Folder and category endpoints. Both kinds share one set of helpers and
//! differ only in the table they address.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::files::{file_to_response, FileResponse};
use crate::api::response::{ApiError, AppJson, JSend};
use crate::auth::AuthUser;
use crate::dashboard::{summarize_group, summarize_groups, GroupSummary};
use crate::storage::models::{GroupKind, GroupRecord};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GroupRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroupDetailResponse {
    pub summary: GroupSummary,
    pub files: Vec<FileResponse>,
}

#[derive(Debug, Serialize)]
pub struct DeleteGroupResponse {
    pub message: String,
    pub files_detached: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_folders(
    state: State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<JSend<Vec<GroupSummary>>>, ApiError> {
    list_groups(GroupKind::Folder, state, user).await
}

pub async fn list_categories(
    state: State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<JSend<Vec<GroupSummary>>>, ApiError> {
    list_groups(GroupKind::Category, state, user).await
}

pub async fn create_folder(
    state: State<Arc<AppState>>,
    user: AuthUser,
    body: AppJson<GroupRequest>,
) -> Result<Json<JSend<GroupSummary>>, ApiError> {
    create_group(GroupKind::Folder, state, user, body).await
}

pub async fn create_category(
    state: State<Arc<AppState>>,
    user: AuthUser,
    body: AppJson<GroupRequest>,
) -> Result<Json<JSend<GroupSummary>>, ApiError> {
    create_group(GroupKind::Category, state, user, body).await
}

pub async fn get_folder(
    state: State<Arc<AppState>>,
    user: AuthUser,
    id: Path<String>,
) -> Result<Json<JSend<GroupDetailResponse>>, ApiError> {
    get_group(GroupKind::Folder, state, user, id).await
}

pub async fn get_category(
    state: State<Arc<AppState>>,
    user: AuthUser,
    id: Path<String>,
) -> Result<Json<JSend<GroupDetailResponse>>, ApiError> {
    get_group(GroupKind::Category, state, user, id).await
}

pub async fn rename_folder(
    state: State<Arc<AppState>>,
    user: AuthUser,
    id: Path<String>,
    body: AppJson<GroupRequest>,
) -> Result<Json<JSend<GroupSummary>>, ApiError> {
    rename_group(GroupKind::Folder, state, user, id, body).await
}

pub async fn rename_category(
    state: State<Arc<AppState>>,
    user: AuthUser,
    id: Path<String>,
    body: AppJson<GroupRequest>,
) -> Result<Json<JSend<GroupSummary>>, ApiError> {
    rename_group(GroupKind::Category, state, user, id, body).await
}

pub async fn delete_folder(
    state: State<Arc<AppState>>,
    user: AuthUser,
    id: Path<String>,
) -> Result<Json<JSend<DeleteGroupResponse>>, ApiError> {
    delete_group(GroupKind::Folder, state, user, id).await
}

pub async fn delete_category(
    state: State<Arc<AppState>>,
    user: AuthUser,
    id: Path<String>,
) -> Result<Json<JSend<DeleteGroupResponse>>, ApiError> {
    delete_group(GroupKind::Category, state, user, id).await
}

// ============================================================================
// Shared implementations
// ============================================================================

async fn list_groups(
    kind: GroupKind,
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
) -> Result<Json<JSend<Vec<GroupSummary>>>, ApiError> {
    let groups = state.db.list_groups(kind)?;
    let files = state.db.list_files()?;
    Ok(JSend::success(summarize_groups(kind, &groups, &files)))
}

async fn create_group(
    kind: GroupKind,
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    AppJson(req): AppJson<GroupRequest>,
) -> Result<Json<JSend<GroupSummary>>, ApiError> {
    let name = required_name(kind, req.name)?;

    let group = GroupRecord {
        id: uuid::Uuid::new_v4().to_string(),
        name,
        created_at: chrono::Utc::now(),
    };
    state.db.put_group(kind, &group)?;
    state.db.append_log(
        &claims.sub,
        &format!("Created {} {}", kind.label(), group.name),
        None,
    )?;

    tracing::debug!(kind = kind.label(), group_id = %group.id, "Created group");
    Ok(JSend::success(summarize_group(kind, &group, &[])))
}

async fn get_group(
    kind: GroupKind,
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<JSend<GroupDetailResponse>>, ApiError> {
    let group = state
        .db
        .get_group(kind, &id)?
        .ok_or_else(|| not_found(kind))?;
    let files = state.db.list_files_in_group(kind, &id)?;

    Ok(JSend::success(GroupDetailResponse {
        summary: summarize_group(kind, &group, &files),
        files: files.iter().map(file_to_response).collect(),
    }))
}

async fn rename_group(
    kind: GroupKind,
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<GroupRequest>,
) -> Result<Json<JSend<GroupSummary>>, ApiError> {
    let name = required_name(kind, req.name)?;

    let group = state
        .db
        .rename_group(kind, &id, &name)?
        .ok_or_else(|| not_found(kind))?;
    state.db.append_log(
        &claims.sub,
        &format!("Renamed {} {}", kind.label(), group.name),
        None,
    )?;

    let files = state.db.list_files_in_group(kind, &id)?;
    Ok(JSend::success(summarize_group(kind, &group, &files)))
}

async fn delete_group(
    kind: GroupKind,
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<JSend<DeleteGroupResponse>>, ApiError> {
    let group = state
        .db
        .get_group(kind, &id)?
        .ok_or_else(|| not_found(kind))?;
    let files_detached = state
        .db
        .delete_group(kind, &id)?
        .ok_or_else(|| not_found(kind))?;
    state.db.append_log(
        &claims.sub,
        &format!("Deleted {} {}", kind.label(), group.name),
        None,
    )?;

    Ok(JSend::success(DeleteGroupResponse {
        message: format!("{} deleted successfully", kind.label()),
        files_detached,
    }))
}

fn required_name(kind: GroupKind, name: Option<String>) -> Result<String, ApiError> {
    name.map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            ApiError::bad_request(format!("{} name is required", kind.label()))
        })
}

fn not_found(kind: GroupKind) -> ApiError {
    ApiError::not_found(format!("{} not found", kind.label()))
}
