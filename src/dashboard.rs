//! The dashboard view model: folder and category summaries plus the file
//! table with its type filter and select-all flag.
//!
//! Nothing here is persisted. A view is rebuilt from the stored records on
//! every request, so navigating away resets the filter and selection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::storage::models::{FileRecord, FileType, GroupKind, GroupRecord, UserRecord};

/// The file table's single filter criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Document,
    Pdf,
    Image,
}

impl TypeFilter {
    pub fn matches(&self, file_type: FileType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Document => file_type == FileType::Document,
            TypeFilter::Pdf => file_type == FileType::Pdf,
            TypeFilter::Image => file_type == FileType::Image,
        }
    }

    /// Shown instead of rows when a type filter matches nothing.
    /// The unfiltered table has no such message.
    pub fn empty_message(&self) -> Option<&'static str> {
        match self {
            TypeFilter::All => None,
            TypeFilter::Document => Some("There are no documents"),
            TypeFilter::Pdf => Some("There are no PDFs"),
            TypeFilter::Image => Some("There are no images"),
        }
    }
}

/// Keep the files matching `filter`, preserving their order.
pub fn filter_files(files: &[FileRecord], filter: TypeFilter) -> Vec<&FileRecord> {
    files.iter().filter(|f| filter.matches(f.file_type)).collect()
}

/// Derived totals for one folder or category.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub id: String,
    pub name: String,
    pub kind: GroupKind,
    pub file_count: u64,
    pub total_size: u64,
    /// e.g. "3 file(s)"
    pub count_label: String,
    /// e.g. "1.3GB"
    pub size_label: String,
}

pub fn summarize_group(kind: GroupKind, group: &GroupRecord, files: &[FileRecord]) -> GroupSummary {
    let (file_count, total_size) = files
        .iter()
        .filter(|f| kind.group_of(f) == Some(group.id.as_str()))
        .fold((0u64, 0u64), |(count, size), f| (count + 1, size + f.byte_size));

    GroupSummary {
        id: group.id.clone(),
        name: group.name.clone(),
        kind,
        file_count,
        total_size,
        count_label: format!("{file_count} file(s)"),
        size_label: format_size(total_size),
    }
}

pub fn summarize_groups(
    kind: GroupKind,
    groups: &[GroupRecord],
    files: &[FileRecord],
) -> Vec<GroupSummary> {
    groups
        .iter()
        .map(|g| summarize_group(kind, g, files))
        .collect()
}

/// Human-readable byte count with one decimal above 1KB.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes}B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1}{}", UNITS[unit])
}

#[derive(Debug, Clone, Serialize)]
pub struct FileRow {
    pub id: String,
    pub file_name: String,
    pub uploaded_by: Option<String>,
    pub email: Option<String>,
    pub size: String,
    pub last_modified: String,
    pub file_type: FileType,
    pub selected: bool,
}

/// What the table body shows.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableContent {
    Rows { rows: Vec<FileRow> },
    NoResults { message: &'static str },
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub folders: Vec<GroupSummary>,
    pub categories: Vec<GroupSummary>,
    pub filter: TypeFilter,
    pub select_all: bool,
    pub table: TableContent,
}

/// Records a dashboard is built from.
pub struct DashboardData<'a> {
    pub folders: &'a [GroupRecord],
    pub categories: &'a [GroupRecord],
    pub files: &'a [FileRecord],
    pub users: &'a [UserRecord],
}

impl DashboardView {
    pub fn build(data: &DashboardData<'_>, filter: TypeFilter, select_all: bool) -> Self {
        let users: HashMap<&str, &UserRecord> =
            data.users.iter().map(|u| (u.id.as_str(), u)).collect();

        let rows: Vec<FileRow> = filter_files(data.files, filter)
            .into_iter()
            .map(|f| {
                let uploader = users.get(f.user_id.as_str());
                FileRow {
                    id: f.id.clone(),
                    file_name: f.file_name.clone(),
                    uploaded_by: uploader.map(|u| u.username.clone()),
                    email: uploader.and_then(|u| u.email.clone()),
                    size: f.file_size.clone(),
                    last_modified: f.updated_at.format("%-d-%m-%Y").to_string(),
                    file_type: f.file_type,
                    selected: select_all,
                }
            })
            .collect();

        let table = match filter.empty_message() {
            Some(message) if rows.is_empty() => TableContent::NoResults { message },
            _ => TableContent::Rows { rows },
        };

        Self {
            folders: summarize_groups(GroupKind::Folder, data.folders, data.files),
            categories: summarize_groups(GroupKind::Category, data.categories, data.files),
            filter,
            select_all,
            table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn file(id: &str, file_type: FileType, folder: Option<&str>, byte_size: u64) -> FileRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        FileRecord {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            folder_id: folder.map(|s| s.to_string()),
            category_id: None,
            file_name: format!("{id}.bin"),
            file_size: "1.3MB".to_string(),
            byte_size,
            description: None,
            cloud_url: format!("file:///tmp/{id}"),
            storage_key: format!("{id}.bin"),
            mime_type: "application/octet-stream".to_string(),
            file_type,
            created_at: at,
            updated_at: at,
        }
    }

    fn group(id: &str, name: &str) -> GroupRecord {
        GroupRecord {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    fn user() -> UserRecord {
        UserRecord {
            id: "user-1".to_string(),
            username: "Emily Radiance".to_string(),
            email: Some("emilyradiance94@gmail.com".to_string()),
            password_hash: String::new(),
            role: crate::storage::models::Role::User,
            created_at: Utc::now(),
        }
    }

    fn sample_files() -> Vec<FileRecord> {
        vec![
            file("a", FileType::Pdf, Some("dev"), 100),
            file("b", FileType::Document, None, 200),
            file("c", FileType::Pdf, Some("dev"), 300),
            file("d", FileType::Pdf, Some("cloud"), 400),
        ]
    }

    #[test]
    fn test_filter_preserves_order() {
        let files = sample_files();
        let ids: Vec<&str> = filter_files(&files, TypeFilter::Pdf)
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c", "d"]);

        assert_eq!(filter_files(&files, TypeFilter::All).len(), 4);
        assert!(filter_files(&files, TypeFilter::Image).is_empty());
    }

    #[test]
    fn test_no_results_only_for_type_filters() {
        let files = sample_files();
        let data = DashboardData {
            folders: &[],
            categories: &[],
            files: &files,
            users: &[],
        };

        let view = DashboardView::build(&data, TypeFilter::Image, false);
        assert!(matches!(
            view.table,
            TableContent::NoResults {
                message: "There are no images"
            }
        ));

        let empty = DashboardData {
            folders: &[],
            categories: &[],
            files: &[],
            users: &[],
        };
        let view = DashboardView::build(&empty, TypeFilter::All, false);
        assert!(matches!(view.table, TableContent::Rows { ref rows } if rows.is_empty()));
    }

    #[test]
    fn test_rows_carry_uploader_and_selection() {
        let files = sample_files();
        let users = vec![user()];
        let data = DashboardData {
            folders: &[],
            categories: &[],
            files: &files,
            users: &users,
        };

        let view = DashboardView::build(&data, TypeFilter::Document, true);
        let TableContent::Rows { rows } = view.table else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "b");
        assert_eq!(rows[0].uploaded_by.as_deref(), Some("Emily Radiance"));
        assert_eq!(rows[0].email.as_deref(), Some("emilyradiance94@gmail.com"));
        assert_eq!(rows[0].last_modified, "2-01-2024");
        assert!(rows[0].selected);
    }

    #[test]
    fn test_group_summaries_are_derived() {
        let files = sample_files();
        let folders = vec![group("dev", "Development"), group("empty", "Data Cloud")];

        let summaries = summarize_groups(GroupKind::Folder, &folders, &files);
        assert_eq!(summaries[0].file_count, 2);
        assert_eq!(summaries[0].total_size, 400);
        assert_eq!(summaries[0].count_label, "2 file(s)");
        assert_eq!(summaries[1].file_count, 0);
        assert_eq!(summaries[1].size_label, "0B");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(1023), "1023B");
        assert_eq!(format_size(1536), "1.5KB");
        assert_eq!(format_size(1_363_149), "1.3MB");
        assert_eq!(format_size(1_395_864_371), "1.3GB");
    }

    #[test]
    fn test_filter_wire_names() {
        let parsed: TypeFilter = serde_json::from_str("\"pdf\"").unwrap();
        assert_eq!(parsed, TypeFilter::Pdf);
        assert_eq!(TypeFilter::default(), TypeFilter::All);
    }
}
