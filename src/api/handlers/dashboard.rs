use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::response::{ApiError, AppQuery, JSend};
use crate::auth::AuthUser;
use crate::dashboard::{DashboardData, DashboardView, TypeFilter};
use crate::storage::models::GroupKind;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DashboardQuery {
    #[serde(rename = "type")]
    pub filter: TypeFilter,
    pub select_all: bool,
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    AppQuery(query): AppQuery<DashboardQuery>,
) -> Result<Json<JSend<DashboardView>>, ApiError> {
    let folders = state.db.list_groups(GroupKind::Folder)?;
    let categories = state.db.list_groups(GroupKind::Category)?;
    let files = state.db.list_files()?;
    let users = state.db.list_users()?;

    let data = DashboardData {
        folders: &folders,
        categories: &categories,
        files: &files,
        users: &users,
    };

    Ok(JSend::success(DashboardView::build(
        &data,
        query.filter,
        query.select_all,
    )))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::create_router;
    use crate::storage::models::Role;
    use crate::testutil::{body_json, seed_file, sign_in_as, test_state};

    fn get(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_filters_by_type() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let token = sign_in_as(&state, "emily", Role::User);
        seed_file(&state, "report.pdf", b"%PDF-1.4", None).await;
        seed_file(&state, "photo.png", b"\x89PNG", None).await;
        let app = create_router(state);

        let resp = app
            .clone()
            .oneshot(get("/dashboard?type=pdf&select_all=true", &token))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["filter"], "pdf");
        assert_eq!(json["data"]["table"]["kind"], "rows");
        let rows = json["data"]["table"]["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["file_name"], "report.pdf");
        assert_eq!(rows[0]["uploaded_by"], "emily");
        assert_eq!(rows[0]["selected"], true);

        let resp = app
            .clone()
            .oneshot(get("/dashboard?type=document", &token))
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["data"]["table"]["kind"], "no_results");
        assert_eq!(json["data"]["table"]["message"], "There are no documents");

        let resp = app.oneshot(get("/dashboard", &token)).await.unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["data"]["filter"], "all");
        assert_eq!(json["data"]["table"]["rows"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_filter_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let token = sign_in_as(&state, "emily", Role::User);
        let app = create_router(state);

        let resp = app
            .oneshot(get("/dashboard?type=spreadsheet", &token))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
