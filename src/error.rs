use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Configuration could not be loaded, or the roots are unusable.
    #[display("invalid configuration")]
    Config,
    /// The filesystem watcher could not be started on the source root.
    #[display("could not watch {}", _0.display())]
    Watch(#[error(not(source))] PathBuf),
}
