use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Multipart framing needs a little room beyond the payload itself
    let upload_limit = state.config.max_upload_size as usize + 64 * 1024;

    Router::new()
        // Files
        .route(
            "/files",
            get(handlers::list_files)
                .post(handlers::create_file)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/files/:id",
            get(handlers::get_file)
                .put(handlers::update_file)
                .delete(handlers::delete_file)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Folders and categories
        .route(
            "/folders",
            get(handlers::list_folders).post(handlers::create_folder),
        )
        .route(
            "/folders/:id",
            get(handlers::get_folder)
                .put(handlers::rename_folder)
                .delete(handlers::delete_folder),
        )
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/categories/:id",
            get(handlers::get_category)
                .put(handlers::rename_category)
                .delete(handlers::delete_category),
        )
        // Accounts
        .route("/auth/signin", post(handlers::sign_in))
        .route("/auth/register", post(handlers::register))
        .route("/auth/users", get(handlers::list_users))
        // Views
        .route("/dashboard", get(handlers::dashboard))
        .route("/logs", get(handlers::list_logs))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
