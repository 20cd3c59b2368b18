//! Conversion of an OPF document into [`BookMetadata`].

use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::{BookMetadata, Identifier};
use crate::schema::{self, Package};
use exn::ResultExt;
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::instrument;

/// Parses the text of a `metadata.opf` sidecar into a [`BookMetadata`].
///
/// The document must be a `package` element containing a `metadata` element;
/// everything inside `metadata` is optional.
///
/// # Errors
///
/// - [`ErrorKind::MalformedXml`] if the document can't be read as XML at all.
/// - [`ErrorKind::InvalidDocument`] if the root element isn't `package` or the
///   `metadata` block is missing or malformed. The deserializer's diagnostic
///   is attached to the error tree.
///
/// # Examples
///
/// ```
/// let opf = r#"<package><metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
///     <dc:title>First Book</dc:title>
///     <dc:creator>John Smith</dc:creator>
///     <meta name="calibre:series" content="Books"/>
///     <meta name="calibre:series_index" content="1"/>
/// </metadata></package>"#;
/// let metadata = booklink_opf::parse(opf).unwrap();
/// assert_eq!(metadata.title.as_deref(), Some("First Book"));
/// assert_eq!(metadata.series_index, Some(1.0));
/// ```
#[instrument(level = "debug", skip(xml), fields(xml_size = xml.len()))]
pub fn parse(xml: &str) -> Result<BookMetadata> {
    check_root(xml)?;
    let package: Package = quick_xml::de::from_str(xml).or_raise(|| ErrorKind::InvalidDocument)?;
    let metadata = package.metadata;
    Ok(BookMetadata {
        id: select_identifier(&metadata.identifiers),
        title: first_text(&metadata.titles),
        creator: first_text(&metadata.creators),
        series: meta(&metadata.metas, consts::META_SERIES).map(|s| s.trim().to_string()),
        series_index: series_index(meta(&metadata.metas, consts::META_SERIES_INDEX)),
    })
}

/// The deserializer doesn't care what the root element is called, so check it
/// separately: a random XML file named `metadata.opf` shouldn't pass.
fn check_root(xml: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event().or_raise(|| ErrorKind::MalformedXml)? {
            Event::Start(e) | Event::Empty(e) => {
                if e.local_name().as_ref() != consts::ROOT_ELEMENT {
                    exn::bail!(ErrorKind::InvalidDocument);
                }
                return Ok(());
            },
            Event::Eof => exn::bail!(ErrorKind::InvalidDocument),
            // Declaration, doctype, comments, whitespace.
            _ => {},
        }
    }
}

fn select_identifier(identifiers: &[schema::Identifier]) -> Option<Identifier> {
    let usable = || identifiers.iter().filter(|i| !i.text.trim().is_empty());
    consts::PREFERRED_SCHEMES
        .iter()
        .find_map(|preferred| {
            usable().find(|i| i.scheme.as_deref().is_some_and(|scheme| scheme.trim().eq_ignore_ascii_case(preferred)))
        })
        .or_else(|| usable().next())
        .map(|i| Identifier::from(i.text.as_str()))
}

fn first_text(elements: &[schema::Text]) -> Option<String> {
    elements.iter().map(|e| e.text.trim()).find(|t| !t.is_empty()).map(str::to_string)
}

fn meta<'a>(metas: &'a [schema::Meta], name: &str) -> Option<&'a str> {
    metas.iter().find(|m| m.name.as_deref() == Some(name)).and_then(|m| m.content.as_deref())
}

/// Anything that isn't a finite number is treated as no index at all, which
/// routes the book by title and creator instead.
fn series_index(content: Option<&str>) -> Option<f64> {
    let content = content?.trim();
    let index = content.parse::<f64>().ok().filter(|i| i.is_finite());
    if index.is_none() {
        tracing::debug!(content, "Ignoring unparseable series index");
    }
    index
}
