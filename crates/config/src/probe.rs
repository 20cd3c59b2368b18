//! Start-up check that the two roots can share inodes.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs;
use std::path::Path;

/// Create a throwaway file in `source`, hardlink it into `target`, then remove
/// both copies. Removal is attempted even when linking fails.
///
/// Uses blocking I/O; this runs exactly once before the runtime starts doing
/// any real work.
pub(crate) fn hardlink(source: &Path, target: &Path) -> Result<()> {
    let name = format!(".booklink-probe-{}", std::process::id());
    let original = source.join(&name);
    let link = target.join(&name);
    let unsupported = || ErrorKind::HardlinkUnsupported {
        source: source.to_path_buf(),
        target: target.to_path_buf(),
    };

    fs::write(&original, b"").or_raise(unsupported)?;
    let linked = fs::hard_link(&original, &link).or_raise(unsupported);
    if linked.is_ok()
        && let Err(e) = fs::remove_file(&link)
    {
        tracing::warn!(path = %link.display(), error = %e, "Could not remove hardlink probe");
    }
    if let Err(e) = fs::remove_file(&original) {
        tracing::warn!(path = %original.display(), error = %e, "Could not remove hardlink probe");
    }
    linked
}
