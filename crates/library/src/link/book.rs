use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::link::error::{ErrorKind, Result as LinkResult};
use crate::naming::target_path;
use crate::scan::SourceEntry;
use booklink_opf::BookMetadata;
use booklink_storage::LocalTree;
use booklink_storage::error::ErrorKind as StorageErrorKind;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// The outcome of (successfully) linking a single book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A new hardlink was created.
    Linked(PathBuf),
    /// A single-link leftover was removed and replaced by a fresh hardlink.
    Relinked(PathBuf),
    /// The target already has two or more links and was left alone.
    Confirmed(PathBuf),
    /// The book has no title, so it was not mirrored.
    Skipped,
}
impl Action {
    /// The mirrored path (relative to the target root) this book occupies, if any.
    pub fn target(&self) -> Option<&Path> {
        match self {
            Self::Linked(p) | Self::Relinked(p) | Self::Confirmed(p) => Some(p),
            Self::Skipped => None,
        }
    }
}

/// Mirrors one source book into the target tree.
///
/// Books without a title are skipped with a warning: a missing title is the
/// best signal available that the metadata is empty or unusable, even though
/// [`target_path`] could fall back to a placeholder.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Link>`](LibraryErrorKind::Link) raised from
/// the failing step. The error only concerns this book.
pub async fn link_book(ctx: &Context, entry: &SourceEntry) -> LibraryResult<Action> {
    link_book_inner(&ctx.target, &entry.path, &entry.metadata).await.or_raise(|| LibraryErrorKind::Link)
}

#[instrument(level = "debug", skip_all, fields(source = %source.display()))]
pub(crate) async fn link_book_inner(tree: &LocalTree, source: &Path, metadata: &BookMetadata) -> LinkResult<Action> {
    if metadata.title.is_none() {
        tracing::warn!(source = %source.display(), "Book has no title; not mirroring it");
        return Ok(Action::Skipped);
    }

    let target = target_path(metadata);
    let relative = target.relative();
    tree.create_dir_all(&target.directory)
        .await
        .or_raise(|| ErrorKind::CreateDirectory(target.directory.clone()))?;

    let existing = match tree.stat(&relative).await {
        Ok(file) => Some(file),
        Err(e) if matches!(&*e, StorageErrorKind::NotFound(_)) => None,
        Err(e) => return Err(e).or_raise(|| ErrorKind::Inspect(relative.clone())),
    };
    let action = match existing {
        Some(file) if !file.is_orphaned() => return Ok(Action::Confirmed(relative)),
        Some(_) => {
            tracing::info!(target = %relative.display(), "Replacing stray single-link file");
            tree.remove(&relative).await.or_raise(|| ErrorKind::RemoveStray(relative.clone()))?;
            Action::Relinked(relative.clone())
        },
        None => Action::Linked(relative.clone()),
    };
    tree.hard_link(source, &relative).await.or_raise(|| ErrorKind::HardLink {
        source: source.to_path_buf(),
        target: relative.clone(),
    })?;
    tracing::info!(source = %source.display(), target = %relative.display(), "Linked book");
    Ok(action)
}
