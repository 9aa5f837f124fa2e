use redb::TableDefinition;

/// File records: uuid -> FileRecord (msgpack)
pub const FILES: TableDefinition<&str, &[u8]> = TableDefinition::new("files");

/// Folder records: uuid -> GroupRecord (msgpack)
pub const FOLDERS: TableDefinition<&str, &[u8]> = TableDefinition::new("folders");

/// Category records: uuid -> GroupRecord (msgpack)
pub const CATEGORIES: TableDefinition<&str, &[u8]> = TableDefinition::new("categories");

/// User records: uuid -> UserRecord (msgpack)
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Username index: username -> uuid (for sign-in lookups and uniqueness)
pub const USERNAMES: TableDefinition<&str, &str> = TableDefinition::new("usernames");

/// Audit log: sequence -> LogRecord (msgpack). Append-only.
pub const LOGS: TableDefinition<u64, &[u8]> = TableDefinition::new("logs");
