//! Discovery of books in the source library and of mirrored files in the
//! target tree.
//!
//! Neither side keeps any state between passes: every sync re-lists both
//! trees from scratch, so the cost of a pass grows linearly with the size of
//! the mirror.

pub(crate) mod error;
mod source;
mod target;

pub use self::source::{SourceEntry, scan_book, scan_source};
pub use self::target::{TargetFileSet, scan_target};

use crate::naming::EBOOK_EXTENSION;
use std::path::Path;

/// Whether a file name carries the e-book extension (case-sensitive).
pub(crate) fn is_ebook(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == EBOOK_EXTENSION)
}
