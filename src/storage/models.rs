use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Three-state patch value for partial updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Patch<T> {
    /// Field was not included in the request (no change).
    #[default]
    Absent,
    /// Field was explicitly cleared.
    Null,
    /// Field was set to a new value.
    Value(T),
}

impl Patch<String> {
    /// Form fields carry no null; an empty value clears the field.
    pub fn from_form(value: Option<String>) -> Self {
        match value {
            None => Patch::Absent,
            Some(v) if v.trim().is_empty() => Patch::Null,
            Some(v) => Patch::Value(v),
        }
    }
}

impl<T: Clone> Patch<T> {
    /// Apply the patch to an optional field in place.
    pub fn apply_to(&self, field: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *field = None,
            Patch::Value(v) => *field = Some(v.clone()),
        }
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }
}

/// Classification of a file derived from its MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Audio,
    Binary,
    Document,
    Image,
    Pdf,
    Video,
}

impl FileType {
    /// Derive a file type classification from a MIME type string.
    pub fn from_mime(mime_type: &str) -> Self {
        let primary = mime_type.split('/').next().unwrap_or("");
        match primary {
            "audio" => FileType::Audio,
            "image" => FileType::Image,
            "video" => FileType::Video,
            "text" | "application" => {
                let sub = mime_type.split('/').nth(1).unwrap_or("");
                match sub {
                    "pdf" => FileType::Pdf,
                    "msword"
                    | "rtf"
                    | "csv"
                    | "vnd.oasis.opendocument.text"
                    | "vnd.openxmlformats-officedocument.wordprocessingml.document"
                    | "vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                    | "vnd.openxmlformats-officedocument.presentationml.presentation"
                    | "vnd.ms-excel"
                    | "vnd.ms-powerpoint" => FileType::Document,
                    _ if primary == "text" => FileType::Document,
                    _ => FileType::Binary,
                }
            }
            _ => FileType::Binary,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Audio => "audio",
            FileType::Binary => "binary",
            FileType::Document => "document",
            FileType::Image => "image",
            FileType::Pdf => "pdf",
            FileType::Video => "video",
        }
    }
}

/// A file's metadata record. The bytes live in the object store under
/// `storage_key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    pub file_name: String,
    /// Size label as supplied by the uploader, e.g. "1.3MB"
    pub file_size: String,
    pub byte_size: u64,
    #[serde(default)]
    pub description: Option<String>,
    pub cloud_url: String,
    pub storage_key: String,
    pub mime_type: String,
    pub file_type: FileType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a successful object-store write, carried into the record.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub storage_key: String,
    pub cloud_url: String,
    pub byte_size: u64,
    pub mime_type: String,
    pub file_type: FileType,
}

/// Partial update of a file record.
#[derive(Debug, Clone, Default)]
pub struct FileUpdate {
    pub file_name: Option<String>,
    pub file_size: Option<String>,
    pub folder_id: Patch<String>,
    pub category_id: Patch<String>,
    pub description: Patch<String>,
    /// Present when a new payload was uploaded; replaces the URL and key.
    pub object: Option<StoredObject>,
}

impl FileUpdate {
    pub fn is_empty(&self) -> bool {
        self.file_name.is_none()
            && self.file_size.is_none()
            && self.folder_id.is_absent()
            && self.category_id.is_absent()
            && self.description.is_absent()
            && self.object.is_none()
    }
}

/// The two kinds of file grouping. Both share one record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Category,
    Folder,
}

impl GroupKind {
    /// The file field that references a group of this kind.
    pub fn group_of<'a>(&self, file: &'a FileRecord) -> Option<&'a str> {
        match self {
            GroupKind::Category => file.category_id.as_deref(),
            GroupKind::Folder => file.folder_id.as_deref(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GroupKind::Category => "Category",
            GroupKind::Folder => "Folder",
        }
    }
}

/// A folder or category. File counts and sizes are derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::SuperAdmin => "super_admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Argon2id PHC string
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// An audit log entry. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: u64,
    pub user_id: String,
    pub action_taken: String,
    #[serde(default)]
    pub file_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
