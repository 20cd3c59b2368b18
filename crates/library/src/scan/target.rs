use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::scan::error::ErrorKind;
use crate::scan::is_ebook;
use booklink_storage::Entry;
use exn::ResultExt;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::instrument;

/// Relative paths (`directory/file.epub`) of every mirrored e-book.
pub type TargetFileSet = BTreeSet<PathBuf>;

/// Lists every e-book one level below the target root.
///
/// Files sitting directly in the target root are never part of the set (and
/// so are never pruned): every mirrored book lives inside a directory. A
/// subdirectory that can't be listed is logged and left out, which keeps its
/// files safe from pruning this pass.
///
/// # Errors
/// Fails only when the target root itself can't be listed.
#[instrument(skip_all, fields(target = %ctx.target.root().display()))]
pub async fn scan_target(ctx: &Context) -> LibraryResult<TargetFileSet> {
    let tree = &ctx.target;
    let directories = tree
        .list(None)
        .await
        .or_raise(|| ErrorKind::Listing(tree.root().to_path_buf()))
        .or_raise(|| LibraryErrorKind::Listing)?;

    let mut files = TargetFileSet::new();
    for directory in directories {
        let Entry::Directory(directory) = directory else {
            continue;
        };
        match tree.list(Some(&directory)).await {
            Ok(entries) => files.extend(entries.into_iter().filter_map(|entry| match entry {
                Entry::File(file) if is_ebook(&file.path) => Some(file.path),
                _ => None,
            })),
            Err(e) => tracing::warn!(directory = %directory.display(), error = ?e, "Could not list mirror directory"),
        }
    }
    tracing::debug!(files = files.len(), "Scanned mirror");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn touch(root: &Path, path: &str) {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"epub").unwrap();
    }

    #[tokio::test]
    async fn test_lists_one_level_down() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source");
        let target = temp_dir.path().join("target");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::create_dir_all(&target).unwrap();
        touch(&target, "Books/Books - 01.epub");
        touch(&target, "Books/Books - 03.epub");
        touch(&target, "A Book - Jane Doe/A Book - Jane Doe.epub");
        // Never included:
        touch(&target, "loose.epub");
        touch(&target, "Books/cover.jpg");
        touch(&target, "Books/nested/deeper.epub");

        let ctx = Context::new(&source, &target).unwrap();
        let files = scan_target(&ctx).await.unwrap();
        let expected: TargetFileSet = [
            "A Book - Jane Doe/A Book - Jane Doe.epub",
            "Books/Books - 01.epub",
            "Books/Books - 03.epub",
        ]
        .into_iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(files, expected);
    }

    #[tokio::test]
    async fn test_empty_target() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ctx = Context::new(temp_dir.path(), temp_dir.path()).unwrap();
        assert!(scan_target(&ctx).await.unwrap().is_empty());
    }
}
