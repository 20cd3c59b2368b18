//! Parsing of the `metadata.opf` sidecar Calibre keeps next to every book.
//!
//! Only the handful of fields needed to place a book in the mirror are read:
//! identifiers, title, creator, and the `calibre:series` /
//! `calibre:series_index` meta entries.

mod consts;
pub mod error;
pub mod models;
mod parse;
mod schema;

pub use crate::models::{BookMetadata, Identifier};
pub use crate::parse::parse;

/// File name of the sidecar document inside every book folder.
pub const SIDECAR_FILE_NAME: &str = "metadata.opf";
