pub mod error;
mod models;
mod path;
mod remove;
mod tree;

pub use crate::models::{Entry, FileInfo};
pub use crate::path::validate as validate_path;
pub use crate::remove::{is_removable, remove_file};
pub use crate::tree::{EntryStream, LocalTree};
