mod admin;
mod auth;
mod dashboard;
mod files;
mod groups;
mod logs;

pub use admin::health;
pub use auth::{list_users, register, sign_in};
pub use dashboard::dashboard;
pub use files::{create_file, delete_file, get_file, list_files, update_file};
pub use groups::{
    create_category, create_folder, delete_category, delete_folder, get_category, get_folder,
    list_categories, list_folders, rename_category, rename_folder,
};
pub use logs::list_logs;
