use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppJson, JSend};
use crate::auth::{self, AuthError, AuthUser, NewUser, RequireSuperAdmin};
use crate::storage::models::{Role, UserRecord};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub email: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
}

/// A user without its password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
    pub created_at: String,
}

fn default_role() -> Role {
    Role::User
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SignInRequest>,
) -> Result<Json<JSend<SignInResponse>>, ApiError> {
    let db = state.db.clone();
    let user = run_blocking(move || auth::authenticate(&db, &req.username, &req.password)).await?;
    let token = state.tokens.issue(&user)?;

    tracing::info!(user_id = %user.id, "User signed in");

    Ok(JSend::success(SignInResponse {
        token,
        token_type: "Bearer",
        expires_in: state.tokens.expiry_seconds(),
        user: user_to_response(&user),
    }))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
) -> Result<Json<JSend<Vec<UserResponse>>>, ApiError> {
    let users = state.db.list_users()?;
    Ok(JSend::success(users.iter().map(user_to_response).collect()))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    RequireSuperAdmin(claims): RequireSuperAdmin,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<Json<JSend<UserResponse>>, ApiError> {
    let db = state.db.clone();
    let new_user = NewUser {
        username: req.username,
        password: req.password,
        email: req.email,
        role: req.role,
    };
    let user = run_blocking(move || auth::register_user(&db, new_user)).await?;
    state
        .db
        .append_log(&claims.sub, &format!("Registered User {}", user.username), None)?;

    Ok(JSend::success(user_to_response(&user)))
}

/// Argon2 is CPU-bound, so hashing and verification run off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("Password task failed: {e}")))?
        .map_err(ApiError::from)
}

fn user_to_response(user: &UserRecord) -> UserResponse {
    UserResponse {
        id: user.id.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role,
        created_at: user.created_at.to_rfc3339(),
    }
}
