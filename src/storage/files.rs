use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{FileRecord, FileUpdate, GroupKind};
use super::tables::*;

impl Database {
    // ========================================================================
    // File operations
    // ========================================================================

    /// Store a file record, replacing any record with the same id
    pub fn put_file(&self, file: &FileRecord) -> Result<(), DatabaseError> {
        debug_assert!(!file.id.is_empty(), "file id must not be empty");
        debug_assert!(
            !file.cloud_url.is_empty(),
            "file must not be persisted before its upload succeeded"
        );

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(FILES)?;
            let data = rmp_serde::to_vec_named(file)?;
            table.insert(file.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a file by its UUID
    pub fn get_file(&self, id: &str) -> Result<Option<FileRecord>, DatabaseError> {
        self.get_record(FILES, id)
    }

    /// All files, oldest first
    pub fn list_files(&self) -> Result<Vec<FileRecord>, DatabaseError> {
        let mut files: Vec<FileRecord> = self.get_all_records(FILES)?;
        files.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(files)
    }

    /// Files that reference the given folder or category, oldest first
    pub fn list_files_in_group(
        &self,
        kind: GroupKind,
        group_id: &str,
    ) -> Result<Vec<FileRecord>, DatabaseError> {
        Ok(self
            .list_files()?
            .into_iter()
            .filter(|f| kind.group_of(f) == Some(group_id))
            .collect())
    }

    /// Merge a partial update into an existing record.
    /// Returns the updated record, or `None` if no record has this id.
    pub fn update_file(
        &self,
        id: &str,
        update: &FileUpdate,
    ) -> Result<Option<FileRecord>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing: Option<FileRecord> = {
            let table = write_txn.open_table(FILES)?;
            let result = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            result
        };

        let updated = match existing {
            Some(mut file) => {
                // The new object lands before any field is merged
                if let Some(ref object) = update.object {
                    file.storage_key = object.storage_key.clone();
                    file.cloud_url = object.cloud_url.clone();
                    file.byte_size = object.byte_size;
                    file.mime_type = object.mime_type.clone();
                    file.file_type = object.file_type;
                }
                if let Some(ref name) = update.file_name {
                    file.file_name = name.clone();
                }
                if let Some(ref size) = update.file_size {
                    file.file_size = size.clone();
                }
                update.folder_id.apply_to(&mut file.folder_id);
                update.category_id.apply_to(&mut file.category_id);
                update.description.apply_to(&mut file.description);

                file.updated_at = chrono::Utc::now();

                let serialized = rmp_serde::to_vec_named(&file)?;
                let mut table = write_txn.open_table(FILES)?;
                table.insert(id, serialized.as_slice())?;
                Some(file)
            }
            None => None,
        };

        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete a file by its UUID, returning the removed record
    pub fn delete_file(&self, id: &str) -> Result<Option<FileRecord>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let removed: Option<FileRecord> = {
            let mut table = write_txn.open_table(FILES)?;
            let result = match table.remove(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            result
        };

        write_txn.commit()?;
        Ok(removed)
    }

    /// Check whether any file is stored under `storage_key`
    pub fn storage_key_in_use(&self, storage_key: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(FILES)?;

        for result in table.iter()? {
            let (_, value) = result?;
            let file: FileRecord = rmp_serde::from_slice(value.value())?;
            if file.storage_key == storage_key {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
