//! Serde schema for the subset of an OPF package document that we read.
//!
//! quick-xml matches element and attribute names on their local name, so
//! `dc:title` deserializes as `title` and `opf:scheme` as `@scheme`. The
//! prefixed aliases are there for documents produced without namespaces.
//! Unknown elements (`manifest`, `spine`, `guide`, other `dc:*` fields) are
//! ignored.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct Package {
    pub metadata: Metadata,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Metadata {
    #[serde(rename = "identifier", alias = "dc:identifier", default)]
    pub identifiers: Vec<Identifier>,
    #[serde(rename = "title", alias = "dc:title", default)]
    pub titles: Vec<Text>,
    #[serde(rename = "creator", alias = "dc:creator", default)]
    pub creators: Vec<Text>,
    #[serde(rename = "meta", default)]
    pub metas: Vec<Meta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Identifier {
    #[serde(rename = "@scheme", alias = "@opf:scheme", default)]
    pub scheme: Option<String>,
    #[serde(rename = "$text", default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Text {
    #[serde(rename = "$text", default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Meta {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,
    #[serde(rename = "@content", default)]
    pub content: Option<String>,
}
