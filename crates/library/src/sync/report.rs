use crate::link::Action;
use derive_more::Display;
use std::path::PathBuf;

/// Two source books that map to the same mirrored path in one pass.
///
/// `first` and `second` are in this pass's scan order, which is unspecified.
/// Only one of them is mirrored: whichever claimed the path in the pass that
/// first created it. On a later pass that may be either one.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("{} claimed by both {} and {}", target.display(), first.display(), second.display())]
pub struct Collision {
    pub target: PathBuf,
    pub first: PathBuf,
    pub second: PathBuf,
}

/// Counters describing one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Source books discovered
    pub books: usize,
    /// New hardlinks created
    pub linked: usize,
    /// Stray single-link files replaced by hardlinks
    pub relinked: usize,
    /// Mirrored files already in place
    pub confirmed: usize,
    /// Books not mirrored because they have no title
    pub skipped: usize,
    /// Stale mirror files removed
    pub pruned: usize,
    /// Per-book or per-file failures (scan, link or prune)
    pub failed: usize,
    pub collisions: Vec<Collision>,
}
impl SyncReport {
    pub(crate) fn record(&mut self, action: &Action) {
        match action {
            Action::Linked(_) => self.linked += 1,
            Action::Relinked(_) => self.relinked += 1,
            Action::Confirmed(_) => self.confirmed += 1,
            Action::Skipped => self.skipped += 1,
        }
    }

    /// `true` when the pass changed nothing in the mirror.
    pub fn is_noop(&self) -> bool {
        self.linked == 0 && self.relinked == 0 && self.pruned == 0
    }
}
