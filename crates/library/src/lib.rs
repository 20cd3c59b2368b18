pub mod coordinator;
pub mod error;
pub mod link;
pub mod naming;
pub mod scan;
pub mod sync;

use booklink_storage::LocalTree;
use booklink_storage::error::Result as StorageResult;
use std::path::Path;

pub use crate::naming::{TargetPath, target_path};
pub use crate::sync::{SyncReport, sync};

/// The two trees every operation works against, built once at start-up and
/// passed down by reference.
#[derive(Debug, Clone)]
pub struct Context {
    /// The author/book library; never written to.
    pub source: LocalTree,
    /// The flat mirror.
    pub target: LocalTree,
}
impl Context {
    pub fn new(source: impl AsRef<Path>, target: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self {
            source: LocalTree::new(source)?,
            target: LocalTree::new(target)?,
        })
    }
}
