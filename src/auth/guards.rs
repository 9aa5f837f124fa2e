//! Extractors that authenticate the caller before a handler runs.
//!
//! ```ignore
//! pub async fn handler(AuthUser(claims): AuthUser) { ... }
//! pub async fn privileged(RequireSuperAdmin(claims): RequireSuperAdmin) { ... }
//! ```

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::sync::Arc;

use super::{require_role, Claims};
use crate::api::response::ApiError;
use crate::storage::models::Role;
use crate::AppState;

/// Any caller holding a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

        let claims = state.tokens.verify(token.trim())?;
        Ok(AuthUser(claims))
    }
}

/// A caller with the super admin role.
#[derive(Debug, Clone)]
pub struct RequireSuperAdmin(pub Claims);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for RequireSuperAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        require_role(&claims, Role::SuperAdmin)?;
        Ok(RequireSuperAdmin(claims))
    }
}
