use redb::{ReadableTable, TableDefinition};

use super::db::{Database, DatabaseError};
use super::models::{FileRecord, GroupKind, GroupRecord};
use super::tables::*;

impl GroupKind {
    fn table(&self) -> TableDefinition<'static, &'static str, &'static [u8]> {
        match self {
            GroupKind::Category => CATEGORIES,
            GroupKind::Folder => FOLDERS,
        }
    }
}

impl Database {
    // ========================================================================
    // Folder and category operations
    // ========================================================================

    pub fn put_group(&self, kind: GroupKind, group: &GroupRecord) -> Result<(), DatabaseError> {
        debug_assert!(!group.id.is_empty(), "group id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(kind.table())?;
            let data = rmp_serde::to_vec_named(group)?;
            table.insert(group.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_group(&self, kind: GroupKind, id: &str) -> Result<Option<GroupRecord>, DatabaseError> {
        self.get_record(kind.table(), id)
    }

    /// All groups of a kind, oldest first
    pub fn list_groups(&self, kind: GroupKind) -> Result<Vec<GroupRecord>, DatabaseError> {
        let mut groups: Vec<GroupRecord> = self.get_all_records(kind.table())?;
        groups.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(groups)
    }

    /// Rename a group. Returns the updated record, or `None` if it does not exist.
    pub fn rename_group(
        &self,
        kind: GroupKind,
        id: &str,
        name: &str,
    ) -> Result<Option<GroupRecord>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing: Option<GroupRecord> = {
            let table = write_txn.open_table(kind.table())?;
            let result = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            result
        };

        let updated = match existing {
            Some(mut group) => {
                group.name = name.to_string();
                let data = rmp_serde::to_vec_named(&group)?;
                let mut table = write_txn.open_table(kind.table())?;
                table.insert(id, data.as_slice())?;
                Some(group)
            }
            None => None,
        };

        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete a group and detach every file that referenced it.
    /// Returns the number of files detached, or `None` if the group did not exist.
    pub fn delete_group(&self, kind: GroupKind, id: &str) -> Result<Option<u64>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existed = {
            let mut table = write_txn.open_table(kind.table())?;
            let result = table.remove(id)?.is_some();
            result
        };

        if !existed {
            write_txn.commit()?;
            return Ok(None);
        }

        let mut detached = 0;
        {
            let members: Vec<FileRecord> = {
                let table = write_txn.open_table(FILES)?;
                let mut members = Vec::new();
                for result in table.iter()? {
                    let (_, value) = result?;
                    let file: FileRecord = rmp_serde::from_slice(value.value())?;
                    if kind.group_of(&file) == Some(id) {
                        members.push(file);
                    }
                }
                members
            };

            let mut table = write_txn.open_table(FILES)?;
            for mut file in members {
                match kind {
                    GroupKind::Category => file.category_id = None,
                    GroupKind::Folder => file.folder_id = None,
                }
                let data = rmp_serde::to_vec_named(&file)?;
                table.insert(file.id.as_str(), data.as_slice())?;
                detached += 1;
            }
        }

        write_txn.commit()?;
        Ok(Some(detached))
    }
}
