//! Configuration Error Types
//!
//! Every error in this crate is fatal: the process can't do anything useful
//! without two valid, link-compatible directories.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Configuration sources could not be merged or are missing required keys.
    #[display("could not load configuration")]
    Load,
    /// A configured root does not exist or is not a directory.
    #[display("{role} directory is not a directory: {}", path.display())]
    NotADirectory {
        role: &'static str,
        #[error(not(source))]
        path: PathBuf,
    },
    /// The two roots can't be hardlinked together (different filesystems,
    /// read-only mounts, missing permissions).
    #[display("cannot hardlink from {} into {}", source.display(), target.display())]
    HardlinkUnsupported {
        #[error(not(source))]
        source: PathBuf,
        #[error(not(source))]
        target: PathBuf,
    },
}
