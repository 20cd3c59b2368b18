//! Error types for the [`scan`](super) module.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A scan error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A directory could not be listed.
    #[display("could not list directory: {}", _0.display())]
    Listing(#[error(not(source))] PathBuf),
    /// A book's `metadata.opf` could not be read or failed validation.
    #[display("invalid sidecar: {}", _0.display())]
    Sidecar(#[error(not(source))] PathBuf),
}
