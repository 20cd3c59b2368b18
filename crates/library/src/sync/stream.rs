use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::link::{Action, link_book};
use crate::scan::{SourceEntry, scan_source, scan_target};
use crate::sync::{Collision, SyncReport};
use async_stream::stream;
use exn::ResultExt;
use futures::{Stream, StreamExt};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use tracing::instrument;

/// Progress events emitted by [`sync_events`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) exactly once.
/// 2. [`Scanned`](Self::Scanned) exactly once, after both trees are listed.
/// 3. [`Linked`](Self::Linked) and [`Collision`](Self::Collision), one per
///    source book.
/// 4. [`Pruned`](Self::Pruned), one per stale mirror file, then
///    [`PrunedDirectory`](Self::PrunedDirectory) for every mirror directory
///    those removals left empty.
/// 5. [`Complete`](Self::Complete) exactly once.
///
/// `Err` items may appear anywhere between `Started` and `Complete`; they
/// concern a single book or file and never end the stream.
#[derive(Debug)]
pub enum SyncEvent {
    Started,
    /// Both trees have been listed.
    Scanned { books: usize, mirrored: usize },
    /// A source book was processed by the linker.
    Linked { source: PathBuf, action: Action },
    /// A second book in this pass mapped to an already claimed path.
    Collision(Collision),
    /// A stale mirror file was removed.
    Pruned(PathBuf),
    /// A mirror directory was removed after pruning emptied it.
    PrunedDirectory(PathBuf),
    Complete,
}

/// Streams the events of one reconciliation pass (scan, link, prune).
///
/// Books are linked one at a time in scan order so that collisions between
/// books resolve the same way for the whole pass. If either tree can't be
/// listed in full, the pass still links but skips pruning: a book missing
/// from an incomplete source listing must not lose its mirrored file.
pub fn sync_events(ctx: &Context) -> impl Stream<Item = LibraryResult<SyncEvent>> + '_ {
    stream!({
        yield Ok(SyncEvent::Started);

        let mut books: Vec<SourceEntry> = Vec::new();
        let mut source_complete = true;
        for await entry in scan_source(ctx) {
            match entry {
                Ok(entry) => books.push(entry),
                Err(e) => {
                    source_complete &= !matches!(&*e, LibraryErrorKind::Listing);
                    yield Err(e);
                },
            }
        }
        let (mut stale, target_complete) = match scan_target(ctx).await {
            Ok(files) => (files, true),
            Err(e) => {
                yield Err(e);
                (Default::default(), false)
            },
        };
        let prune = source_complete && target_complete;
        if !prune {
            tracing::warn!("Not pruning the mirror: a directory could not be listed");
        }
        yield Ok(SyncEvent::Scanned { books: books.len(), mirrored: stale.len() });

        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
        for book in books {
            let action = match link_book(ctx, &book).await {
                Ok(action) => action,
                Err(e) => {
                    yield Err(e);
                    continue;
                },
            };
            if let Some(target) = action.target() {
                // Still wanted: keep it out of the prune list.
                stale.remove(target);
                if let Some(first) = claimed.get(target) {
                    yield Ok(SyncEvent::Collision(Collision {
                        target: target.to_path_buf(),
                        first: first.clone(),
                        second: book.path.clone(),
                    }));
                } else {
                    claimed.insert(target.to_path_buf(), book.path.clone());
                }
            }
            yield Ok(SyncEvent::Linked { source: book.path, action });
        }

        if prune {
            let mut emptied: BTreeSet<PathBuf> = BTreeSet::new();
            for path in stale {
                match ctx.target.remove(&path).await.or_raise(|| LibraryErrorKind::Prune) {
                    Ok(()) => {
                        emptied.extend(path.parent().filter(|p| !p.as_os_str().is_empty()).map(PathBuf::from));
                        yield Ok(SyncEvent::Pruned(path));
                    },
                    Err(e) => yield Err(e),
                }
            }
            for directory in emptied {
                match ctx.target.remove_empty_dir(&directory).await.or_raise(|| LibraryErrorKind::Prune) {
                    Ok(true) => yield Ok(SyncEvent::PrunedDirectory(directory)),
                    Ok(false) => {},
                    Err(e) => yield Err(e),
                }
            }
        }

        yield Ok(SyncEvent::Complete);
    })
}

/// Runs one reconciliation pass to completion, logging as it goes.
///
/// Never fails as a whole: every error is logged against the book or file it
/// concerns and counted in [`SyncReport::failed`].
#[instrument(skip_all, fields(source = %ctx.source.root().display(), target = %ctx.target.root().display()))]
pub async fn sync(ctx: &Context) -> SyncReport {
    let mut report = SyncReport::default();
    let events = sync_events(ctx);
    futures::pin_mut!(events);
    while let Some(event) = events.next().await {
        match event {
            Ok(SyncEvent::Started) => tracing::debug!("Sync started"),
            Ok(SyncEvent::Scanned { books, mirrored }) => {
                report.books = books;
                tracing::debug!(books, mirrored, "Scanned library and mirror");
            },
            Ok(SyncEvent::Linked { source, action }) => {
                tracing::trace!(source = %source.display(), ?action, "Processed book");
                report.record(&action);
            },
            Ok(SyncEvent::Collision(collision)) => {
                tracing::warn!(
                    target = %collision.target.display(),
                    first = %collision.first.display(),
                    second = %collision.second.display(),
                    "Two books map to the same mirrored file; only one is mirrored"
                );
                report.collisions.push(collision);
            },
            Ok(SyncEvent::Pruned(path)) => {
                tracing::info!(path = %path.display(), "Pruned stale file");
                report.pruned += 1;
            },
            Ok(SyncEvent::PrunedDirectory(path)) => {
                tracing::debug!(path = %path.display(), "Removed empty mirror directory");
            },
            Ok(SyncEvent::Complete) => {},
            Err(e) => {
                tracing::error!(error = ?e, "{}", *e);
                report.failed += 1;
            },
        }
    }
    tracing::info!(
        books = report.books,
        linked = report.linked,
        relinked = report.relinked,
        confirmed = report.confirmed,
        skipped = report.skipped,
        pruned = report.pruned,
        failed = report.failed,
        "Sync complete"
    );
    report
}
