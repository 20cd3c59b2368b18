//! Sidecar Parsing Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A parsing error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for parsing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document is not well-formed XML.
    #[display("malformed XML")]
    MalformedXml,
    /// The document parsed, but is not shaped like `package > metadata`.
    /// The deserializer's diagnostic is attached as the child error.
    #[display("invalid OPF document: expected `package > metadata`")]
    InvalidDocument,
}
