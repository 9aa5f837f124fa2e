use redb::{ReadableTable, ReadableTableMetadata};

use super::db::{Database, DatabaseError};
use super::models::UserRecord;
use super::tables::*;

impl Database {
    // ========================================================================
    // User operations
    // ========================================================================

    /// Insert a new user. Returns `false` without writing if the username is taken.
    pub fn create_user(&self, user: &UserRecord) -> Result<bool, DatabaseError> {
        debug_assert!(!user.id.is_empty(), "user id must not be empty");

        let write_txn = self.begin_write()?;
        let created = {
            let mut usernames = write_txn.open_table(USERNAMES)?;
            let taken = usernames.get(user.username.as_str())?.is_some();
            if taken {
                false
            } else {
                usernames.insert(user.username.as_str(), user.id.as_str())?;
                let mut table = write_txn.open_table(USERS)?;
                let data = rmp_serde::to_vec_named(user)?;
                table.insert(user.id.as_str(), data.as_slice())?;
                true
            }
        };
        write_txn.commit()?;
        Ok(created)
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserRecord>, DatabaseError> {
        self.get_record(USERS, id)
    }

    /// Resolve username -> uuid -> user
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let usernames = read_txn.open_table(USERNAMES)?;

        let id = match usernames.get(username)? {
            Some(data) => data.value().to_string(),
            None => return Ok(None),
        };

        let users = read_txn.open_table(USERS)?;
        let result = match users.get(id.as_str())? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        };
        result
    }

    /// All users, oldest first
    pub fn list_users(&self) -> Result<Vec<UserRecord>, DatabaseError> {
        let mut users: Vec<UserRecord> = self.get_all_records(USERS)?;
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    pub fn count_users(&self) -> Result<u64, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        Ok(table.len()?)
    }
}
