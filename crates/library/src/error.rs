//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Each kind names the stage of a sync
//! pass that failed; the child frames say why.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A source or mirror directory could not be listed, so the pass can't
    /// see the whole tree.
    #[display("listing failed")]
    Listing,
    /// One book folder could not be scanned.
    #[display("scan failed")]
    Scan,
    /// One book could not be linked into the mirror.
    #[display("link failed")]
    Link,
    /// One stale mirror file could not be removed.
    #[display("prune failed")]
    Prune,
}
