use derive_more::Display;

/// A book identifier, as declared by a `dc:identifier` element.
///
/// Calibre writes its internal book ID as a bare integer, so purely numeric
/// identifiers are kept as numbers.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Number(u64),
    Text(String),
}
impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<u64>() {
            // `u64::from_str` accepts a leading `+`, which isn't a bare number.
            Ok(n) if s.bytes().all(|b| b.is_ascii_digit()) => Self::Number(n),
            _ => Self::Text(s.to_string()),
        }
    }
}
