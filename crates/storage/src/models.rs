//! Storage models.

use std::fs::Metadata;
use std::path::PathBuf;

/// File metadata returned by a [`LocalTree`](crate::LocalTree).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from the tree root
    pub path: PathBuf,
    /// Number of hardlinks pointing at the file's inode
    pub links: u64,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, metadata: &Metadata) -> Self {
        Self {
            path: path.into(),
            links: link_count(metadata),
        }
    }

    /// A file with fewer than two links is not shared with anything else.
    pub fn is_orphaned(&self) -> bool {
        self.links < 2
    }
}

/// One item from a non-recursive directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A subdirectory, relative to the tree root.
    Directory(PathBuf),
    /// A regular file.
    File(FileInfo),
}

#[cfg(unix)]
fn link_count(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.nlink()
}

// Link counts are not exposed through std on other platforms.
#[cfg(not(unix))]
fn link_count(_metadata: &Metadata) -> u64 {
    1
}
