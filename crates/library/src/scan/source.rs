use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::scan::error::{ErrorKind, Result as ScanResult};
use crate::scan::is_ebook;
use async_stream::stream;
use booklink_opf::{BookMetadata, SIDECAR_FILE_NAME};
use booklink_storage::{Entry, FileInfo, LocalTree};
use exn::ResultExt;
use futures::Stream;
use std::path::{Path, PathBuf};

/// One book found in the source library.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntry {
    /// Absolute path of the book's e-book file
    pub path: PathBuf,
    pub metadata: BookMetadata,
}

/// Streams every qualifying book under `<source>/<author>/<book>/`.
///
/// A book folder qualifies when it directly contains at least one `.epub` file
/// and a file named exactly `metadata.opf`; anything else is skipped without
/// complaint. A sidecar that can't be read or parsed is yielded as an `Err`
/// item for that one book and the walk carries on. Only a failure to list the
/// source root itself ends the stream early.
///
/// A directory that can't be listed is raised as [`LibraryErrorKind::Listing`]
/// (books may be missing from the results); a bad sidecar as
/// [`LibraryErrorKind::Scan`] (only that book is missing).
///
/// Entries are yielded in directory listing order, which is unspecified.
pub fn scan_source(ctx: &Context) -> impl Stream<Item = LibraryResult<SourceEntry>> + '_ {
    stream! {
        for await entry in scan_source_inner(&ctx.source) {
            let kind = match &entry {
                Err(e) if matches!(&**e, ErrorKind::Listing(_)) => LibraryErrorKind::Listing,
                _ => LibraryErrorKind::Scan,
            };
            yield entry.or_raise(|| kind);
        }
    }
}

fn scan_source_inner(tree: &LocalTree) -> impl Stream<Item = ScanResult<SourceEntry>> + '_ {
    stream!({
        let authors = match tree.list(None).await.or_raise(|| ErrorKind::Listing(tree.root().to_path_buf())) {
            Ok(entries) => entries,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        for author in authors.into_iter().filter_map(directory) {
            let books = match tree.list(Some(&author)).await.or_raise(|| ErrorKind::Listing(author.clone())) {
                Ok(entries) => entries,
                Err(e) => {
                    yield Err(e);
                    continue;
                },
            };
            for book in books.into_iter().filter_map(directory) {
                match scan_book_inner(tree, &book).await {
                    Ok(Some(entry)) => yield Ok(entry),
                    Ok(None) => tracing::trace!(folder = %book.display(), "Skipping folder without e-book and sidecar"),
                    Err(e) => yield Err(e),
                }
            }
        }
    })
}

fn directory(entry: Entry) -> Option<PathBuf> {
    match entry {
        Entry::Directory(path) => Some(path),
        Entry::File(_) => None,
    }
}

/// Inspects a single book folder (relative to the source root).
///
/// Returns `Ok(None)` for folders that don't look like a book. When several
/// e-book files are present, the first by name is used.
pub async fn scan_book(ctx: &Context, folder: impl AsRef<Path>) -> LibraryResult<Option<SourceEntry>> {
    scan_book_inner(&ctx.source, folder.as_ref()).await.or_raise(|| LibraryErrorKind::Scan)
}

async fn scan_book_inner(tree: &LocalTree, folder: &Path) -> ScanResult<Option<SourceEntry>> {
    let files: Vec<FileInfo> = tree
        .list(Some(folder))
        .await
        .or_raise(|| ErrorKind::Listing(folder.to_path_buf()))?
        .into_iter()
        .filter_map(|entry| match entry {
            Entry::File(file) => Some(file),
            Entry::Directory(_) => None,
        })
        .collect();

    let sidecar = files.iter().find(|f| f.path.file_name().is_some_and(|name| name == SIDECAR_FILE_NAME));
    let ebook = files.iter().filter(|f| is_ebook(&f.path)).map(|f| &f.path).min();
    let (Some(sidecar), Some(ebook)) = (sidecar, ebook) else {
        return Ok(None);
    };

    let xml = tree.read_to_string(&sidecar.path).await.or_raise(|| ErrorKind::Sidecar(sidecar.path.clone()))?;
    let metadata = booklink_opf::parse(&xml).or_raise(|| ErrorKind::Sidecar(sidecar.path.clone()))?;
    let path = tree.absolute_path(ebook).or_raise(|| ErrorKind::Listing(folder.to_path_buf()))?;
    Ok(Some(SourceEntry { path, metadata }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    const OPF: &str = r#"<package><metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
        <dc:title>A Book</dc:title><dc:creator>Jane Doe</dc:creator>
    </metadata></package>"#;

    fn write(root: &Path, path: &str, contents: &str) {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn context() -> (tempfile::TempDir, Context) {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("source")).unwrap();
        std::fs::create_dir_all(temp_dir.path().join("target")).unwrap();
        let ctx = Context::new(temp_dir.path().join("source"), temp_dir.path().join("target")).unwrap();
        (temp_dir, ctx)
    }

    #[tokio::test]
    async fn test_finds_qualifying_book() {
        let (_temp_dir, ctx) = context();
        let root = ctx.source.root().to_path_buf();
        write(&root, "Jane Doe/A Book/A Book - Jane Doe.epub", "epub");
        write(&root, "Jane Doe/A Book/metadata.opf", OPF);
        write(&root, "Jane Doe/A Book/cover.jpg", "jpg");

        let entries: Vec<_> = scan_source(&ctx).collect().await;
        assert_eq!(entries.len(), 1);
        let entry = entries.into_iter().next().unwrap().unwrap();
        assert_eq!(entry.path, root.join("Jane Doe/A Book/A Book - Jane Doe.epub"));
        assert_eq!(entry.metadata.title.as_deref(), Some("A Book"));
        assert_eq!(entry.metadata.creator.as_deref(), Some("Jane Doe"));
    }

    #[tokio::test]
    async fn test_skips_non_qualifying_folders() {
        let (_temp_dir, ctx) = context();
        let root = ctx.source.root().to_path_buf();
        // No sidecar.
        write(&root, "Jane Doe/No Sidecar/book.epub", "epub");
        // No e-book.
        write(&root, "Jane Doe/No Book/metadata.opf", OPF);
        // Sidecar with a different name.
        write(&root, "Jane Doe/Wrong Name/book.epub", "epub");
        write(&root, "Jane Doe/Wrong Name/book.opf", OPF);
        // Too shallow: directly inside the author folder.
        write(&root, "Jane Doe/loose.epub", "epub");
        write(&root, "Jane Doe/metadata.opf", OPF);
        // Files at the source root are ignored.
        write(&root, "metadata.db", "sqlite");

        let entries: Vec<_> = scan_source(&ctx).collect().await;
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_sidecar_does_not_abort_scan() {
        let (_temp_dir, ctx) = context();
        let root = ctx.source.root().to_path_buf();
        write(&root, "Jane Doe/Broken/book.epub", "epub");
        write(&root, "Jane Doe/Broken/metadata.opf", "<html>not a package</html>");
        write(&root, "Jane Doe/A Book/book.epub", "epub");
        write(&root, "Jane Doe/A Book/metadata.opf", OPF);

        let entries: Vec<_> = scan_source(&ctx).collect().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.iter().filter(|e| e.is_ok()).count(), 1);
        assert_eq!(entries.iter().filter(|e| e.is_err()).count(), 1);
    }

    #[tokio::test]
    async fn test_missing_root_is_a_listing_error() {
        let (temp_dir, ctx) = context();
        std::fs::rename(ctx.source.root(), temp_dir.path().join("unmounted")).unwrap();
        let entries: Vec<_> = scan_source(&ctx).collect().await;
        assert_eq!(entries.len(), 1);
        let err = entries.into_iter().next().unwrap().unwrap_err();
        assert!(matches!(&*err, LibraryErrorKind::Listing));
    }

    #[tokio::test]
    async fn test_invalid_sidecar_is_a_scan_error() {
        let (_temp_dir, ctx) = context();
        write(ctx.source.root(), "Jane Doe/Broken/book.epub", "epub");
        write(ctx.source.root(), "Jane Doe/Broken/metadata.opf", "<html/>");
        let entries: Vec<_> = scan_source(&ctx).collect().await;
        let err = entries.into_iter().next().unwrap().unwrap_err();
        assert!(matches!(&*err, LibraryErrorKind::Scan));
    }

    #[tokio::test]
    async fn test_scan_book_picks_first_ebook_by_name() {
        let (_temp_dir, ctx) = context();
        let root = ctx.source.root().to_path_buf();
        write(&root, "Jane Doe/A Book/b.epub", "epub");
        write(&root, "Jane Doe/A Book/a.epub", "epub");
        write(&root, "Jane Doe/A Book/metadata.opf", OPF);

        let entry = scan_book(&ctx, "Jane Doe/A Book").await.unwrap().unwrap();
        assert_eq!(entry.path, root.join("Jane Doe/A Book/a.epub"));
        assert!(scan_book(&ctx, "Jane Doe/Missing").await.unwrap().is_none());
    }
}
