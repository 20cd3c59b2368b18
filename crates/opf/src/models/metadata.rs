use super::Identifier;

/// Normalized metadata for one book, extracted from its `metadata.opf`.
///
/// Every field is optional; a field is `None` when the document omits it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookMetadata {
    /// Preferred identifier (uuid, then calibre, then whatever comes first)
    pub id: Option<Identifier>,
    /// Display title
    pub title: Option<String>,
    /// Primary author/creator
    pub creator: Option<String>,
    /// Series name (`calibre:series`)
    pub series: Option<String>,
    /// Position within the series (`calibre:series_index`), always finite
    pub series_index: Option<f64>,
}
impl BookMetadata {
    /// Series name and index, if both are present and the name isn't blank.
    pub fn series_position(&self) -> Option<(&str, f64)> {
        let series = self.series.as_deref().filter(|s| !s.trim().is_empty())?;
        Some((series, self.series_index?))
    }
}
