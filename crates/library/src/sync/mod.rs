//! Reconciliation of the mirror against the source library.
//!
//! A pass has three stages:
//!
//! 1. **Scan** both trees.
//! 2. **Link** every source book; each mirrored path that is (re)confirmed is
//!    struck off the list of known mirror files.
//! 3. **Prune** whatever is left on that list: nothing in the source claims it
//!    any more.
//!
//! Failures are isolated to the book or file they happened on. Running a pass
//! twice against an unchanged library links and prunes nothing the second
//! time.

mod report;
mod stream;

pub use self::report::{Collision, SyncReport};
pub use self::stream::{SyncEvent, sync, sync_events};
