//! Error types for the [`link`](super) module.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A link error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for link operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which step of linking a single book failed.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The target directory could not be created.
    #[display("could not create directory: {_0}")]
    CreateDirectory(#[error(not(source))] String),
    /// Whatever occupies the target path could not be inspected, or is not a
    /// regular file.
    #[display("could not inspect target: {}", _0.display())]
    Inspect(#[error(not(source))] PathBuf),
    /// A single-link leftover occupies the target and could not be removed;
    /// no link is created on top of it.
    #[display("could not remove stray file: {}", _0.display())]
    RemoveStray(#[error(not(source))] PathBuf),
    /// The hardlink itself failed.
    #[display("could not hardlink {} to {}", source.display(), target.display())]
    HardLink {
        #[error(not(source))]
        source: PathBuf,
        #[error(not(source))]
        target: PathBuf,
    },
}
