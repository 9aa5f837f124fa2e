//! file-vault - File storage and sharing API
//!
//! This crate provides file upload, metadata management, and content serving with:
//! - Swappable object storage backends (local filesystem, GCS / Firebase Storage)
//! - redb embedded database for file, folder, category, user and audit log records
//! - JWT sign-in with a role gate on privileged routes
//! - REST API with multipart upload support and a dashboard view model

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod object_store;
pub mod storage;
#[cfg(test)]
pub mod testutil;
pub mod workflow;

use std::sync::Arc;

use auth::TokenKeys;
use config::Config;
use storage::Database;
use workflow::staging::StagingArea;
use workflow::FileWorkflow;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub files: FileWorkflow,
    pub staging: StagingArea,
    pub tokens: TokenKeys,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Database,
        object_store: Arc<dyn object_store::ObjectStore>,
    ) -> Result<Self, std::io::Error> {
        let staging = StagingArea::new(&config.server.staging_dir)?;
        let tokens = TokenKeys::new(&config.auth.jwt_secret, config.auth.token_expiry_seconds);
        let files = FileWorkflow::new(db.clone(), object_store);

        Ok(Self {
            config,
            db,
            files,
            staging,
            tokens,
        })
    }
}
