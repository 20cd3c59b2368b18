/// Identifier schemes in order of preference.
pub(crate) const PREFERRED_SCHEMES: [&str; 2] = ["uuid", "calibre"];

pub(crate) const META_SERIES: &str = "calibre:series";
pub(crate) const META_SERIES_INDEX: &str = "calibre:series_index";

/// Local name of the document's root element.
pub(crate) const ROOT_ELEMENT: &[u8] = b"package";
