//! Local directory tree access.
//!
//! A [`LocalTree`] wraps one root directory (the source library or the mirror)
//! and exposes the handful of operations the sync engine needs: shallow
//! listings, reading sidecars, hardlinking and guarded removal. All paths
//! given to and returned from a tree are relative to its root; I/O goes through
//! `tokio::fs`.

use crate::error::{ErrorKind, Result};
use crate::models::{Entry, FileInfo};
use crate::path::validate as validate_path;
use crate::remove::remove_file;
use async_stream::stream;
use exn::ResultExt;
use futures::{Stream, TryStreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs::{self, DirEntry};

pub type EntryStream<'a> = Pin<Box<dyn Stream<Item = Result<Entry>> + Send + 'a>>;

/// A directory on the local filesystem.
///
/// # Examples
///
/// ```no_run
/// use booklink_storage::LocalTree;
///
/// # fn example() -> booklink_storage::error::Result<()> {
/// let tree = LocalTree::new("/srv/calibre")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: PathBuf,
}
impl LocalTree {
    /// Wrap an existing directory.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidPath`] if the path is not absolute or is
    /// not a directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() || !root.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the absolute path for a relative path, validating it first.
    pub fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    /// Convert an absolute path back to a path relative to the root.
    pub fn relative_path(&self, absolute: impl AsRef<Path>) -> Result<PathBuf> {
        let absolute = absolute.as_ref();
        let relative = absolute
            .strip_prefix(&self.root)
            .or_raise(|| ErrorKind::InvalidPath(absolute.to_path_buf()))?;
        validate_path(relative)
    }

    async fn process_entry(&self, entry: DirEntry) -> Result<Option<Entry>> {
        let path = entry.path();
        // Follows symlinks, so a symlinked book folder is still a folder.
        let metadata = fs::metadata(&path).await.map_err(|e| ErrorKind::from_io(e, &path))?;
        let relative = self.relative_path(&path)?;
        if metadata.is_dir() {
            return Ok(Some(Entry::Directory(relative)));
        }
        if metadata.is_file() {
            return Ok(Some(Entry::File(FileInfo::new(relative, &metadata))));
        }
        Ok(None)
    }

    /// Stream the immediate children of a directory (the root when `dir` is
    /// `None`). Listing a subdirectory that does not exist yields nothing; a
    /// missing root is an error, since "empty" would mean "delete everything"
    /// to a caller reconciling against it.
    pub fn entries<'a>(&'a self, dir: Option<&'a Path>) -> EntryStream<'a> {
        let is_root = dir.is_none();
        let current = match dir.map(|d| self.absolute_path(d)).transpose() {
            Ok(Some(path)) => path,
            Ok(None) => self.root.clone(),
            Err(e) => return Box::pin(futures::stream::once(async { Result::Err(e) })),
        };

        Box::pin(stream! {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(err) if !is_root && err.kind() == std::io::ErrorKind::NotFound => return,
                Err(err) => {
                    yield Err(exn::Exn::from(ErrorKind::from_io(err, &current)));
                    return;
                }
            };
            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(exn::Exn::from(ErrorKind::from_io(e, &current)));
                        break;
                    },
                };
                match self.process_entry(entry).await {
                    Ok(Some(e)) => yield Ok(e),
                    // Sockets, FIFOs and friends.
                    Ok(None) => {},
                    // A broken symlink or an entry that vanished mid-listing.
                    Err(e) if matches!(&*e, ErrorKind::NotFound(_)) => {},
                    Err(e) => yield Err(e),
                }
            }
        })
    }

    /// Collect the immediate children of a directory.
    pub async fn list(&self, dir: Option<&Path>) -> Result<Vec<Entry>> {
        self.entries(dir).try_collect().await
    }

    /// Metadata of a regular file. Anything else at `path` (a directory, a
    /// socket) is [`ErrorKind::NotAFile`].
    pub async fn stat(&self, path: impl AsRef<Path>) -> Result<FileInfo> {
        let path = path.as_ref();
        let abs_path = self.absolute_path(path)?;
        let metadata = fs::metadata(&abs_path).await.map_err(|e| ErrorKind::from_io(e, path))?;
        if !metadata.is_file() {
            exn::bail!(ErrorKind::NotAFile(path.to_path_buf()));
        }
        Ok(FileInfo::new(path, &metadata))
    }

    pub async fn read_to_string(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let abs_path = self.absolute_path(path)?;
        Ok(fs::read_to_string(&abs_path).await.map_err(|e| ErrorKind::from_io(e, path))?)
    }

    /// Create a directory and all of its parents; existing directories are fine.
    pub async fn create_dir_all(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let abs_path = self.absolute_path(path)?;
        Ok(fs::create_dir_all(&abs_path).await.map_err(|e| ErrorKind::from_io(e, path))?)
    }

    /// Create `path` (relative to this tree) as a hardlink of the absolute
    /// `source` file.
    pub async fn hard_link(&self, source: impl AsRef<Path>, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let abs_path = self.absolute_path(path)?;
        Ok(fs::hard_link(source.as_ref(), &abs_path).await.map_err(|e| ErrorKind::from_io(e, path))?)
    }

    /// Remove a directory if, and only if, it is empty. Returns whether it was
    /// removed; a directory that still has entries is left alone.
    pub async fn remove_empty_dir(&self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        let abs_path = self.absolute_path(path)?;
        match fs::remove_dir(&abs_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::DirectoryNotEmpty => Ok(false),
            Err(e) => Err(exn::Exn::from(ErrorKind::from_io(e, path))),
        }
    }

    /// Remove a file through the guarded remover.
    pub async fn remove(&self, path: impl AsRef<Path>) -> Result<()> {
        remove_file(self.absolute_path(path)?).await
    }
}
