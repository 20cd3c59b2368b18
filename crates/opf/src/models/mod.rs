mod identifier;
mod metadata;

pub use self::identifier::Identifier;
pub use self::metadata::BookMetadata;
