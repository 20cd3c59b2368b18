//! Hardlinking of individual books into the mirror.
//!
//! The link count of a mirrored file is the only bookkeeping there is: a file
//! with two or more links is assumed to be mirroring a source book already,
//! while a file with a single link is a leftover (its source was deleted, or a
//! previous pass died half-way) and gets replaced.

pub mod error;
mod book;

pub use self::book::{Action, link_book};
