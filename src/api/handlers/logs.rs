use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::auth::AuthUser;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub id: u64,
    pub user_id: String,
    pub action_taken: String,
    pub file_id: Option<String>,
    pub created_at: String,
}

/// The audit log, oldest first.
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
) -> Result<Json<JSend<Vec<LogResponse>>>, ApiError> {
    let logs = state
        .db
        .list_logs()?
        .into_iter()
        .map(|log| LogResponse {
            id: log.id,
            user_id: log.user_id,
            action_taken: log.action_taken,
            file_id: log.file_id,
            created_at: log.created_at.to_rfc3339(),
        })
        .collect();

    Ok(JSend::success(logs))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::create_router;
    use crate::storage::models::Role;
    use crate::testutil::{body_json, seed_file, sign_in_as, test_state};

    #[tokio::test]
    async fn test_logs_follow_file_actions() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let token = sign_in_as(&state, "emily", Role::User);
        let file = seed_file(&state, "notes.txt", b"hello", None).await;
        state.files.delete("someone", &file.id).await.unwrap();
        let app = create_router(state);

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/logs")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let logs = json["data"].as_array().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0]["action_taken"], "Created File notes.txt");
        assert_eq!(logs[1]["action_taken"], "Deleted File notes.txt");
        assert_eq!(logs[1]["file_id"], file.id.as_str());
    }
}
