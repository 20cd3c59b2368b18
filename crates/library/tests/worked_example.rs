use booklink_library::{Context, sync};
use std::fs::Permissions;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};

struct Library {
    _temp_dir: tempfile::TempDir,
    source: PathBuf,
    target: PathBuf,
}
impl Library {
    fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("calibre");
        let target = temp_dir.path().join("mirror");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::create_dir_all(&target).unwrap();
        Self { _temp_dir: temp_dir, source, target }
    }

    fn context(&self) -> Context {
        Context::new(&self.source, &self.target).unwrap()
    }

    /// Adds `<author>/<folder>/<folder>.epub` with a sidecar built from `meta`.
    fn add_book(&self, author: &str, folder: &str, title: &str, series: Option<(&str, &str)>) -> PathBuf {
        let dir = self.source.join(author).join(folder);
        std::fs::create_dir_all(&dir).unwrap();
        let book = dir.join(format!("{folder}.epub"));
        std::fs::write(&book, format!("contents of {title}")).unwrap();
        std::fs::write(dir.join("metadata.opf"), opf(title, author, series)).unwrap();
        book
    }

    fn mirrored(&self, relative: &str) -> PathBuf {
        self.target.join(relative)
    }

    fn mirrored_files(&self) -> Vec<String> {
        let mut files = Vec::new();
        for dir in std::fs::read_dir(&self.target).unwrap() {
            let dir = dir.unwrap().path();
            for file in std::fs::read_dir(&dir).unwrap() {
                let file = file.unwrap().path();
                files.push(file.strip_prefix(&self.target).unwrap().to_string_lossy().into_owned());
            }
        }
        files.sort();
        files
    }
}

fn opf(title: &str, creator: &str, series: Option<(&str, &str)>) -> String {
    let series = series
        .map(|(name, index)| {
            format!(
                r#"<meta name="calibre:series" content="{name}"/>
                <meta name="calibre:series_index" content="{index}"/>"#
            )
        })
        .unwrap_or_default();
    format!(
        r#"<?xml version='1.0' encoding='utf-8'?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="uuid_id" version="2.0">
    <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
        <dc:identifier opf:scheme="calibre" id="calibre_id">42</dc:identifier>
        <dc:identifier opf:scheme="uuid" id="uuid_id">0b3a2f40-6a4e-4c7e-9d51-3f2b1c9e8a10</dc:identifier>
        <dc:title>{title}</dc:title>
        <dc:creator opf:file-as="{creator}" opf:role="aut">{creator}</dc:creator>
        {series}
    </metadata>
</package>"#
    )
}

fn same_file(a: &Path, b: &Path) -> bool {
    let (a, b) = (std::fs::metadata(a).unwrap(), std::fs::metadata(b).unwrap());
    a.dev() == b.dev() && a.ino() == b.ino()
}

/// Makes `directory` read-only. Returns `false` (and restores it) when the
/// current user can write there anyway, as root can.
fn lock(directory: &Path) -> bool {
    std::fs::set_permissions(directory, Permissions::from_mode(0o555)).unwrap();
    let canary = directory.join(".canary");
    if std::fs::write(&canary, b"").is_ok() {
        std::fs::remove_file(canary).unwrap();
        unlock(directory);
        return false;
    }
    true
}

fn unlock(directory: &Path) {
    std::fs::set_permissions(directory, Permissions::from_mode(0o755)).unwrap();
}

fn worked_example(library: &Library) -> [PathBuf; 4] {
    [
        library.add_book("Jane Doe", "A Book", "A Book", None),
        library.add_book("John Smith", "First Book", "First Book", Some(("Books", "1"))),
        library.add_book("John Smith", "Third Book", "Third Book", Some(("Books", "3"))),
        library.add_book("John Smith", "Just a Book", "Just a Book", None),
    ]
}

#[tokio::test]
async fn test_worked_example() {
    let library = Library::new();
    let [a_book, first, third, just_a_book] = worked_example(&library);

    let report = sync(&library.context()).await;
    assert_eq!(report.books, 4);
    assert_eq!(report.linked, 4);
    assert_eq!(report.failed, 0);
    assert_eq!(
        library.mirrored_files(),
        [
            "A Book - Jane Doe/A Book - Jane Doe.epub",
            "Books/Books - 01.epub",
            "Books/Books - 03.epub",
            "Just a Book - John Smith/Just a Book - John Smith.epub",
        ]
    );
    assert!(same_file(&a_book, &library.mirrored("A Book - Jane Doe/A Book - Jane Doe.epub")));
    assert!(same_file(&first, &library.mirrored("Books/Books - 01.epub")));
    assert!(same_file(&third, &library.mirrored("Books/Books - 03.epub")));
    assert!(same_file(
        &just_a_book,
        &library.mirrored("Just a Book - John Smith/Just a Book - John Smith.epub")
    ));
}

#[tokio::test]
async fn test_second_pass_changes_nothing() {
    let library = Library::new();
    worked_example(&library);
    let ctx = library.context();

    sync(&ctx).await;
    let report = sync(&ctx).await;
    assert!(report.is_noop());
    assert_eq!(report.confirmed, 4);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn test_removed_book_is_pruned() {
    let library = Library::new();
    worked_example(&library);
    let ctx = library.context();
    sync(&ctx).await;

    std::fs::remove_dir_all(library.source.join("John Smith/Third Book")).unwrap();
    let report = sync(&ctx).await;
    assert_eq!(report.pruned, 1);
    assert!(!library.mirrored("Books/Books - 03.epub").exists());
    assert!(library.mirrored("Books/Books - 01.epub").exists());
    // Unrelated files in the mirror root are never touched.
    std::fs::write(library.mirrored("notes.epub"), b"").unwrap();
    assert!(sync(&ctx).await.is_noop());
    assert!(library.mirrored("notes.epub").exists());
}

#[tokio::test]
async fn test_moved_into_series() {
    let library = Library::new();
    let book = library.add_book("Jane Doe", "A Book", "A Book", None);
    let ctx = library.context();
    sync(&ctx).await;

    let sidecar = book.with_file_name("metadata.opf");
    std::fs::write(&sidecar, opf("A Book", "Jane Doe", Some(("Doe Saga", "2.5")))).unwrap();
    let report = sync(&ctx).await;
    assert_eq!(report.linked, 1);
    assert_eq!(report.pruned, 1);
    assert_eq!(library.mirrored_files(), ["Doe Saga/Doe Saga - 2.5.epub"]);
    // The emptied folder goes with it.
    assert!(!library.mirrored("A Book - Jane Doe").exists());
}

#[tokio::test]
async fn test_missing_source_root_keeps_the_mirror() {
    let library = Library::new();
    worked_example(&library);
    let ctx = library.context();
    sync(&ctx).await;

    // e.g. the share holding the library was unmounted.
    std::fs::rename(&library.source, library.source.with_file_name("unmounted")).unwrap();
    let report = sync(&ctx).await;
    assert_eq!(report.books, 0);
    assert_eq!(report.pruned, 0);
    assert!(report.failed > 0);
    assert_eq!(library.mirrored_files().len(), 4);
}

#[tokio::test]
async fn test_unlistable_author_keeps_their_books() {
    let library = Library::new();
    worked_example(&library);
    let ctx = library.context();
    sync(&ctx).await;

    let author = library.source.join("John Smith");
    std::fs::set_permissions(&author, Permissions::from_mode(0o000)).unwrap();
    if std::fs::read_dir(&author).is_ok() {
        // Permission bits don't apply to this user.
        unlock(&author);
        return;
    }
    let report = sync(&ctx).await;
    unlock(&author);
    assert_eq!(report.failed, 1);
    assert_eq!(report.confirmed, 1);
    assert_eq!(report.pruned, 0);
    assert_eq!(library.mirrored_files().len(), 4);
}

#[tokio::test]
async fn test_failed_prune_does_not_stop_pruning() {
    let library = Library::new();
    for stale in ["Locked/Locked.epub", "Open/Open.epub"] {
        let path = library.mirrored(stale);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"leftover").unwrap();
    }
    let locked = library.mirrored("Locked");
    if !lock(&locked) {
        return;
    }

    let report = sync(&library.context()).await;
    unlock(&locked);
    assert_eq!(report.failed, 1);
    assert_eq!(report.pruned, 1);
    assert!(library.mirrored("Locked/Locked.epub").exists());
    assert!(!library.mirrored("Open").exists());
}

#[tokio::test]
async fn test_directory_in_the_way_is_reported() {
    let library = Library::new();
    library.add_book("Jane Doe", "A Book", "A Book", None);
    std::fs::create_dir_all(library.mirrored("A Book - Jane Doe/A Book - Jane Doe.epub")).unwrap();

    let report = sync(&library.context()).await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.confirmed, 0);
    assert_eq!(report.linked, 0);
}

#[tokio::test]
async fn test_unparseable_series_index_routes_by_title() {
    let library = Library::new();
    let book = library.add_book("Jane Doe", "A Book", "A Book", Some(("Books", "first")));

    sync(&library.context()).await;
    assert!(same_file(&book, &library.mirrored("A Book - Jane Doe/A Book - Jane Doe.epub")));
}

#[tokio::test]
async fn test_colliding_books_mirror_only_one() {
    let library = Library::new();
    let one = library.add_book("John Smith", "First Book", "First Book", Some(("Books", "1")));
    let other = library.add_book("John Smith", "First Book Again", "First Book Again", Some(("Books", "1")));
    let ctx = library.context();

    let report = sync(&ctx).await;
    assert_eq!(report.linked, 1);
    assert_eq!(report.confirmed, 1);
    assert_eq!(report.collisions.len(), 1);
    let collision = &report.collisions[0];
    assert_eq!(collision.target, PathBuf::from("Books/Books - 01.epub"));
    let mirrored = library.mirrored("Books/Books - 01.epub");
    assert!(same_file(&collision.first, &mirrored));
    assert!(!same_file(&collision.second, &mirrored));
    let mut claimants = [collision.first.clone(), collision.second.clone()];
    claimants.sort();
    let mut expected = [one, other];
    expected.sort();
    assert_eq!(claimants, expected);

    // The mirror is left alone on the next pass, and the collision is reported again.
    let report = sync(&ctx).await;
    assert!(report.is_noop());
    assert_eq!(report.collisions.len(), 1);
}

#[tokio::test]
async fn test_broken_sidecar_does_not_stop_the_pass() {
    let library = Library::new();
    library.add_book("Jane Doe", "A Book", "A Book", None);
    let broken = library.add_book("John Smith", "First Book", "First Book", None);
    std::fs::write(broken.with_file_name("metadata.opf"), "<not-a-package/>").unwrap();

    let report = sync(&library.context()).await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.linked, 1);
    assert_eq!(library.mirrored_files(), ["A Book - Jane Doe/A Book - Jane Doe.epub"]);
}
