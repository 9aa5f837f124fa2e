//! The file workflow: staged payload → object store → metadata → audit log.
//!
//! Every step is awaited in sequence and nothing is retried. A failed step
//! aborts the steps after it.

pub mod staging;

use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

use crate::object_store::{self, ObjectStore};
use crate::storage::models::{
    FileRecord, FileType, FileUpdate, GroupKind, Patch, StoredObject,
};
use crate::storage::{Database, DatabaseError};
use staging::StagedFile;

pub const REQUIRED_FIELDS_MESSAGE: &str = "File, file_name, file_size are required";

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),
    #[error("Error uploading file: {0}")]
    Upload(String),
    #[error("Error retrieving file: {0}")]
    Retrieval(String),
    #[error("File not found")]
    NotFound,
    #[error("Error updating file: {0}")]
    Update(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Input for creating a file. Everything is optional here so that missing
/// fields surface as a validation failure rather than a parse failure.
#[derive(Debug, Default)]
pub struct NewFile {
    pub staged: Option<StagedFile>,
    pub file_name: Option<String>,
    pub file_size: Option<String>,
    pub folder_id: Option<String>,
    pub category_id: Option<String>,
    pub description: Option<String>,
}

/// Input for updating a file. Empty optional fields clear the value.
#[derive(Debug, Default)]
pub struct FileChanges {
    pub staged: Option<StagedFile>,
    pub file_name: Option<String>,
    pub file_size: Option<String>,
    pub folder_id: Option<String>,
    pub category_id: Option<String>,
    pub description: Option<String>,
}

/// A file record with its bytes.
pub struct FileContent {
    pub file: FileRecord,
    pub data: Bytes,
}

pub struct FileWorkflow {
    db: Database,
    store: Arc<dyn ObjectStore>,
}

impl FileWorkflow {
    pub fn new(db: Database, store: Arc<dyn ObjectStore>) -> Self {
        Self { db, store }
    }

    // ========================================================================
    // Create
    // ========================================================================

    pub async fn create(&self, user_id: &str, input: NewFile) -> Result<FileRecord, WorkflowError> {
        let NewFile {
            staged,
            file_name,
            file_size,
            folder_id,
            category_id,
            description,
        } = input;

        let file_name = non_blank(file_name);
        let file_size = non_blank(file_size);
        let staged = staged.filter(|s| s.byte_size() > 0);
        let (Some(staged), Some(file_name), Some(file_size)) = (staged, file_name, file_size)
        else {
            return Err(WorkflowError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
        };

        validate_file_name(&file_name)?;
        let folder_id = non_blank(folder_id);
        let category_id = non_blank(category_id);
        self.ensure_group(GroupKind::Folder, folder_id.as_deref())?;
        self.ensure_group(GroupKind::Category, category_id.as_deref())?;

        // Whether an existing record already points at this key, checked
        // before the upload replaces the object
        let key_shared = self.db.storage_key_in_use(&file_name)?;

        // Phase 1: object store
        let object = self
            .upload(&staged, &file_name)
            .await
            .map_err(WorkflowError::Upload)?;

        // Phase 2: metadata
        let now = Utc::now();
        let file = FileRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            folder_id,
            category_id,
            file_name,
            file_size,
            byte_size: object.byte_size,
            description: non_blank(description),
            cloud_url: object.cloud_url,
            storage_key: object.storage_key,
            mime_type: object.mime_type,
            file_type: object.file_type,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.db.put_file(&file) {
            if !key_shared {
                if let Err(err) = self.store.delete(&file.storage_key).await {
                    tracing::warn!(storage_key = %file.storage_key, error = %err, "Failed to delete orphaned object");
                }
            }
            return Err(WorkflowError::Upload(e.to_string()));
        }

        // Phase 3: audit
        self.db
            .append_log(user_id, &format!("Created File {}", file.file_name), Some(&file.id))
            .map_err(|e| WorkflowError::Upload(e.to_string()))?;

        // Phase 4: local cleanup
        release(staged).await;

        tracing::debug!(
            file_id = %file.id,
            file_name = %file.file_name,
            file_type = file.file_type.as_str(),
            "Created file"
        );
        Ok(file)
    }

    // ========================================================================
    // Read
    // ========================================================================

    pub fn list(&self) -> Result<Vec<FileRecord>, WorkflowError> {
        Ok(self.db.list_files()?)
    }

    pub fn get(&self, id: &str) -> Result<FileRecord, WorkflowError> {
        self.db.get_file(id)?.ok_or(WorkflowError::NotFound)
    }

    /// Resolve a record and pull its bytes from the object store.
    pub async fn fetch(&self, id: &str) -> Result<FileContent, WorkflowError> {
        let file = self.get(id)?;

        let data = self
            .store
            .get(&file.storage_key)
            .await
            .map_err(|e| WorkflowError::Retrieval(e.to_string()))?;

        Ok(FileContent { file, data })
    }

    // ========================================================================
    // Update
    // ========================================================================

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        changes: FileChanges,
    ) -> Result<FileRecord, WorkflowError> {
        let FileChanges {
            staged,
            file_name,
            file_size,
            folder_id,
            category_id,
            description,
        } = changes;

        let existing = self.get(id)?;

        if let Some(ref name) = file_name {
            validate_file_name(name)?;
        }
        if matches!(file_size, Some(ref size) if size.trim().is_empty()) {
            return Err(WorkflowError::Validation(
                "file_size must not be empty".to_string(),
            ));
        }

        let mut update = FileUpdate {
            file_name,
            file_size,
            folder_id: Patch::from_form(folder_id),
            category_id: Patch::from_form(category_id),
            description: Patch::from_form(description),
            object: None,
        };

        if let Patch::Value(ref folder) = update.folder_id {
            self.ensure_group(GroupKind::Folder, Some(folder))?;
        }
        if let Patch::Value(ref category) = update.category_id {
            self.ensure_group(GroupKind::Category, Some(category))?;
        }

        if update.is_empty() && staged.is_none() {
            return Err(WorkflowError::Validation(
                "at least one field (file, file_name, file_size, folder_id, category_id, description) must be provided"
                    .to_string(),
            ));
        }

        // A new payload goes to the store before any field is merged
        if let Some(ref staged) = staged {
            let key = update.file_name.as_deref().unwrap_or(&existing.file_name);
            let object = self
                .upload(staged, key)
                .await
                .map_err(WorkflowError::Update)?;
            update.object = Some(object);
        }

        let file = self
            .db
            .update_file(id, &update)
            .map_err(|e| WorkflowError::Update(e.to_string()))?
            .ok_or(WorkflowError::NotFound)?;

        if file.storage_key != existing.storage_key {
            self.discard_object(&existing.storage_key).await;
        }

        self.db
            .append_log(user_id, &format!("Updated File {}", file.file_name), Some(&file.id))
            .map_err(|e| WorkflowError::Update(e.to_string()))?;

        if let Some(staged) = staged {
            release(staged).await;
        }

        tracing::debug!(file_id = %id, "Updated file");
        Ok(file)
    }

    // ========================================================================
    // Delete
    // ========================================================================

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<FileRecord, WorkflowError> {
        let file = self.db.delete_file(id)?.ok_or(WorkflowError::NotFound)?;

        self.db
            .append_log(user_id, &format!("Deleted File {}", file.file_name), Some(&file.id))?;

        // Best-effort; other records may share the key
        self.discard_object(&file.storage_key).await;

        tracing::debug!(file_id = %id, "Deleted file");
        Ok(file)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn upload(&self, staged: &StagedFile, key: &str) -> Result<StoredObject, String> {
        let data = staged
            .read()
            .await
            .map_err(|e| format!("failed to read staged copy: {e}"))?;

        let mime_type = staged.mime_type(key);
        let byte_size = data.len() as u64;

        let cloud_url = self
            .store
            .put(key, data, &mime_type)
            .await
            .map_err(|e| e.to_string())?;

        if cloud_url.is_empty() {
            return Err("object store returned an empty URL".to_string());
        }

        Ok(StoredObject {
            storage_key: key.to_string(),
            cloud_url,
            byte_size,
            file_type: FileType::from_mime(&mime_type),
            mime_type,
        })
    }

    /// Delete a stored object unless a record still points at it.
    async fn discard_object(&self, storage_key: &str) {
        match self.db.storage_key_in_use(storage_key) {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(storage_key, error = %e, "Skipping object cleanup");
                return;
            }
        }

        if let Err(e) = self.store.delete(storage_key).await {
            tracing::warn!(storage_key, error = %e, "Failed to delete object from storage");
        }
    }

    fn ensure_group(&self, kind: GroupKind, id: Option<&str>) -> Result<(), WorkflowError> {
        let Some(id) = id else {
            return Ok(());
        };
        if self.db.get_group(kind, id)?.is_none() {
            return Err(WorkflowError::Validation(format!(
                "{} '{id}' does not exist",
                kind.label()
            )));
        }
        Ok(())
    }
}

async fn release(staged: StagedFile) {
    let path = staged.path().to_path_buf();
    if let Err(e) = staged.remove().await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged copy");
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_file_name(name: &str) -> Result<(), WorkflowError> {
    object_store::validate_key(name).map_err(|_| {
        WorkflowError::Validation(
            "file_name must be non-empty and must not contain path separators".to_string(),
        )
    })
}
