//! Deterministic placement of books inside the mirror.
//!
//! Converts [`BookMetadata`] into a `(directory, file)` pair. The reading app
//! on the other side expects every volume of a series to share one flat
//! folder, while standalone books get a folder of their own:
//!
//! | Metadata                         | Directory            | File                         |
//! |----------------------------------|----------------------|------------------------------|
//! | series `Books`, index `1`        | `Books`              | `Books - 01.epub`            |
//! | series `Books`, index `2.5`      | `Books`              | `Books - 2.5.epub`           |
//! | no series, `A Book` by Jane Doe  | `A Book - Jane Doe`  | `A Book - Jane Doe.epub`     |
//! | nothing at all                   | `Unknown Title - Unknown Creator` | `Unknown Title - Unknown Creator.epub` |
//!
//! Every free-text component goes through [`sanitize`] first.
//!
//! # Example
//!
//! ```
//! use booklink_library::naming::target_path;
//! use booklink_opf::BookMetadata;
//!
//! let metadata = BookMetadata {
//!     title: Some("First Book".into()),
//!     creator: Some("John Smith".into()),
//!     series: Some("Books".into()),
//!     series_index: Some(1.0),
//!     ..Default::default()
//! };
//! let path = target_path(&metadata);
//! assert_eq!(path.directory, "Books");
//! assert_eq!(path.file, "Books - 01.epub");
//! ```

use booklink_opf::BookMetadata;
use derive_more::Display;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Extension of the e-book files that are mirrored.
pub const EBOOK_EXTENSION: &str = "epub";

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_CREATOR: &str = "Unknown Creator";

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

regex!(WHITESPACE_REGEX, r"\s+");
regex!(DISALLOWED_REGEX, r"[^A-Za-z0-9 ]");

/// Location of a mirrored book, relative to the target root.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("{directory}/{file}")]
pub struct TargetPath {
    pub directory: String,
    pub file: String,
}
impl TargetPath {
    pub fn relative(&self) -> PathBuf {
        PathBuf::from(&self.directory).join(&self.file)
    }
}

/// Collapses runs of whitespace to a single space, then strips every
/// character outside `[A-Za-z0-9 ]`.
///
/// ```
/// use booklink_library::naming::sanitize;
/// assert_eq!(sanitize("The  Hobbit:\tThere & Back"), "The Hobbit There  Back");
/// ```
pub fn sanitize(s: &str) -> String {
    let collapsed = WHITESPACE_REGEX.replace_all(s, " ");
    DISALLOWED_REGEX.replace_all(&collapsed, "").into_owned()
}

/// Renders a series position as an integer when it is whole and as a decimal
/// otherwise, zero-padded to at least two characters.
pub fn index_label(index: f64) -> String {
    // `f64`'s Display already drops the fractional part of whole numbers.
    format!("{:0>2}", index.to_string())
}

/// Computes where a book belongs in the mirror. Total: missing metadata falls
/// back to placeholder names rather than failing.
pub fn target_path(metadata: &BookMetadata) -> TargetPath {
    let series = metadata
        .series_position()
        .map(|(series, index)| (sanitize(series), index))
        .filter(|(series, _)| !series.is_empty());
    match series {
        Some((series, index)) => TargetPath {
            file: format!("{series} - {}.{EBOOK_EXTENSION}", index_label(index)),
            directory: series,
        },
        None => {
            let title = metadata.title.as_deref().map(sanitize).unwrap_or_else(|| UNKNOWN_TITLE.to_string());
            let creator = metadata.creator.as_deref().map(sanitize).unwrap_or_else(|| UNKNOWN_CREATOR.to_string());
            let stem = format!("{title} - {creator}");
            TargetPath {
                file: format!("{stem}.{EBOOK_EXTENSION}"),
                directory: stem,
            }
        },
    }
}
