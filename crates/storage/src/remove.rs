//! Guarded file removal.
//!
//! Everything this program deletes lives at least two directories deep
//! (`<target root>/<directory>/<file>.epub`), so anything shallower than that
//! is refused outright.

use crate::error::{ErrorKind, Result};
use std::path::{MAIN_SEPARATOR, Path};
use tokio::fs;

/// Minimum number of separators a removable path must contain.
const MIN_SEPARATORS: usize = 2;

/// Returns `true` when `path` is deep enough to be removed.
///
/// ```
/// use booklink_storage::is_removable;
/// assert!(is_removable("/library/Books/Books - 01.epub"));
/// assert!(!is_removable("/root-file"));
/// assert!(!is_removable("//server/share"));
/// ```
pub fn is_removable(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref().as_os_str().to_string_lossy();
    let doubled: String = [MAIN_SEPARATOR, MAIN_SEPARATOR].iter().collect();
    path.matches(MAIN_SEPARATOR).count() >= MIN_SEPARATORS && !path.starts_with(&doubled)
}

/// Removes a single file, refusing shallow paths.
///
/// A refusal is reported as [`ErrorKind::Refused`] without touching the
/// filesystem. Any error from the removal itself (missing file, permissions)
/// is returned to the caller.
pub async fn remove_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !is_removable(path) {
        tracing::warn!(path = %path.display(), "Refusing to remove file outside of a mirrored directory");
        exn::bail!(ErrorKind::Refused(path.to_path_buf()));
    }
    fs::remove_file(path).await.map_err(|e| ErrorKind::from_io(e, path))?;
    tracing::debug!(path = %path.display(), "Removed file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/root-file", false)]
    #[case("root-file", false)]
    #[case("/", false)]
    #[case("//host/file.epub", false)]
    #[case("//host/share/file.epub", false)]
    #[case("/library/file.epub", true)]
    #[case("/library/Books/Books - 01.epub", true)]
    fn test_is_removable(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(is_removable(path), expected);
    }

    #[tokio::test]
    async fn test_refuses_without_touching_filesystem() {
        let err = remove_file("/root-file").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Refused(_)));
    }

    #[tokio::test]
    async fn test_removes_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("Books - 01.epub");
        std::fs::write(&file, b"data").unwrap();
        remove_file(&file).await.unwrap();
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = remove_file(temp_dir.path().join("missing.epub")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }
}
