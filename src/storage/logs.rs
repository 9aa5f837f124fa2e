use chrono::Utc;
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::LogRecord;
use super::tables::*;

impl Database {
    // ========================================================================
    // Audit log (append-only)
    // ========================================================================

    /// Append an entry, assigning the next sequence number as its id
    pub fn append_log(
        &self,
        user_id: &str,
        action_taken: &str,
        file_id: Option<&str>,
    ) -> Result<LogRecord, DatabaseError> {
        let write_txn = self.begin_write()?;
        let record = {
            let mut table = write_txn.open_table(LOGS)?;
            let next_id = match table.last()? {
                Some((key, _)) => key.value() + 1,
                None => 1,
            };

            let record = LogRecord {
                id: next_id,
                user_id: user_id.to_string(),
                action_taken: action_taken.to_string(),
                file_id: file_id.map(|s| s.to_string()),
                created_at: Utc::now(),
            };
            let data = rmp_serde::to_vec_named(&record)?;
            table.insert(next_id, data.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }

    /// All entries in append order
    pub fn list_logs(&self) -> Result<Vec<LogRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(LOGS)?;

        let mut logs = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            logs.push(rmp_serde::from_slice(value.value())?);
        }

        Ok(logs)
    }
}
