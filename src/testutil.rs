//! Shared test helpers for handler tests.

use std::sync::Arc;

use axum::body::Body;
use axum::response::Response;
use bytes::Bytes;
use http_body_util::BodyExt;

use crate::auth::{register_user, NewUser};
use crate::config::{AuthConfig, Config, ServerConfig, StorageConfig};
use crate::object_store::LocalStore;
use crate::storage::models::{FileRecord, Role};
use crate::storage::Database;
use crate::workflow::NewFile;
use crate::AppState;

pub const MULTIPART_BOUNDARY: &str = "file-vault-test-boundary";
pub const MULTIPART_CONTENT_TYPE: &str =
    "multipart/form-data; boundary=file-vault-test-boundary";

const TEST_PASSWORD: &str = "test-password";

/// Create a test AppState with a temporary database and local object store.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");
    let files_dir = temp_dir.path().join("files");
    let staging_dir = temp_dir.path().join("staging");

    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            data_dir: data_dir.to_string_lossy().to_string(),
            staging_dir: staging_dir.to_string_lossy().to_string(),
        },
        storage: StorageConfig {
            local_storage_path: files_dir.to_string_lossy().to_string(),
            ..StorageConfig::default()
        },
        auth: AuthConfig {
            jwt_secret: "test-secret-that-is-at-least-32-characters".to_string(),
            ..AuthConfig::default()
        },
        max_upload_size: 64 * 1024, // 64KB for tests
    };

    let db = Database::open(&data_dir).expect("Failed to open test database");
    let object_store = LocalStore::new(&files_dir).expect("Failed to create test object store");

    Arc::new(
        AppState::new(config, db, Arc::new(object_store)).expect("Failed to build test state"),
    )
}

/// Register a user with the given role and return a bearer token for it.
pub fn sign_in_as(state: &AppState, username: &str, role: Role) -> String {
    let user = register_user(
        &state.db,
        NewUser {
            username: username.to_string(),
            password: TEST_PASSWORD.to_string(),
            email: Some(format!("{username}@example.com")),
            role,
        },
    )
    .expect("Failed to register test user");

    state.tokens.issue(&user).expect("Failed to issue test token")
}

/// Create a file through the workflow. Attributed to the first registered
/// user when there is one.
pub async fn seed_file(
    state: &AppState,
    file_name: &str,
    data: &[u8],
    folder_id: Option<&str>,
) -> FileRecord {
    let user_id = state
        .db
        .list_users()
        .expect("Failed to list users")
        .into_iter()
        .next()
        .map(|u| u.id)
        .unwrap_or_else(|| "seed-user".to_string());

    let staged = state
        .staging
        .stage_bytes(data, Some(file_name.to_string()), None)
        .await
        .expect("Failed to stage test payload");

    state
        .files
        .create(
            &user_id,
            NewFile {
                staged: Some(staged),
                file_name: Some(file_name.to_string()),
                file_size: Some(format!("{}B", data.len())),
                folder_id: folder_id.map(|s| s.to_string()),
                ..NewFile::default()
            },
        )
        .await
        .expect("Failed to seed file")
}

/// Encode text fields and an optional `file` part as multipart/form-data.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((filename, content_type, data)) = file {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Response body is not JSON")
}
