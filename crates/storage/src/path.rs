//! Keeps every path a [`LocalTree`](crate::LocalTree) touches inside its root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Resolves a path relative to a tree root, lexically.
///
/// Book folders, series names and sidecars all arrive as paths relative to
/// the source or target root. `.` and `..` are folded away here, and a path
/// that would climb above the root, is empty, or carries a NUL byte (which
/// would silently cut the name short at the syscall) is
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath). A leading `/` is
/// dropped rather than honoured. Symlinks are not resolved.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use booklink_storage::validate_path;
/// assert!(validate_path("Books/Books - 01.epub").is_ok());
/// assert!(validate_path("Jane Doe/A Book/metadata.opf").is_ok());
/// assert!(validate_path("a/../file.epub").is_ok());
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a/../../b").is_err());
/// assert!(validate_path("a\0b").is_err());
/// assert_eq!(
///     validate_path("Series/./../Books//Books - 03.epub").unwrap(),
///     Path::new("Books/Books - 03.epub")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(path.to_path_buf());
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(name) if name.as_encoded_bytes().contains(&0) => exn::bail!(invalid()),
            Component::Normal(name) => resolved.push(name),
            Component::ParentDir if !resolved.pop() => exn::bail!(invalid()),
            Component::ParentDir | Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
        }
    }
    if resolved.as_os_str().is_empty() {
        exn::bail!(invalid());
    }
    Ok(resolved)
}
