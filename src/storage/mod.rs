pub mod db;
mod files;
mod groups;
mod logs;
pub mod models;
mod tables;
mod users;

pub use db::{Database, DatabaseError};
pub use tables::*;
