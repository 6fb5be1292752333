//! Stylesheet parsing.
//!
//! An Ipe stylesheet is an XML document whose `<ipestyle>` element contains
//! the reusable definitions. [`Stylesheet::parse`] locates that container
//! (either as the document root or nested, as in a full `.ipe` document),
//! keeps its verbatim source so it can be embedded into the render document,
//! and records each direct child element as a [`StyleTag`].
//!
//! XML comments anywhere in the document are kept too; they carry the
//! stylesheet's documentation header (see [`crate::documentation`]).

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Element name of the style container.
pub const STYLE_CONTAINER: &str = "ipestyle";

/// Error parsing a stylesheet. Always fatal for the whole stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StylesheetError {
    #[error("malformed stylesheet XML at byte {position}: {message}")]
    Xml { position: usize, message: String },

    #[error("no <ipestyle> container found")]
    MissingContainer,

    #[error("<ipestyle> container is not closed")]
    UnclosedContainer,
}

/// One top-level definition inside the `<ipestyle>` container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTag {
    tag_type: String,
    name: Option<String>,
    attributes: Vec<(String, String)>,
    source: String,
}

impl StyleTag {
    /// Builds a tag directly, mostly useful for tests and custom front ends.
    pub fn new(tag_type: impl Into<String>, name: Option<&str>) -> Self {
        let tag_type = tag_type.into();
        let attributes: Vec<(String, String)> = name
            .map(|n| vec![("name".to_string(), n.to_string())])
            .unwrap_or_default();
        let source = match name {
            Some(n) => format!(
                "<{} name=\"{}\"/>",
                tag_type,
                quick_xml::escape::escape(n)
            ),
            None => format!("<{}/>", tag_type),
        };
        Self {
            tag_type,
            name: name.map(str::to_string),
            attributes,
            source,
        }
    }

    /// The element name, e.g. `symbol`, `dashstyle` or `color`.
    pub fn tag_type(&self) -> &str {
        &self.tag_type
    }

    /// The `name` attribute, if present.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Looks up an attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// The verbatim source of the element, including its children.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// A parsed stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    name: Option<String>,
    container: String,
    tags: Vec<StyleTag>,
    comments: Vec<String>,
}

impl Stylesheet {
    /// Parses stylesheet source text.
    pub fn parse(source: &str) -> Result<Self, StylesheetError> {
        Parser::new(source).run()
    }

    /// The `name` attribute of the `<ipestyle>` container.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Verbatim source of the whole `<ipestyle>` element.
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Top-level definitions in document order.
    pub fn tags(&self) -> &[StyleTag] {
        &self.tags
    }

    /// Text of every XML comment in the document, in order.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }
}

struct PendingTag {
    tag: StyleTag,
    start: usize,
}

struct Parser<'a> {
    source: &'a str,
    reader: Reader<&'a [u8]>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        // No text trimming: event boundaries must map exactly onto source
        // offsets so container and tag sources can be sliced out verbatim.
        let reader = Reader::from_str(source);
        Self { source, reader }
    }

    fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    fn xml_error(&self, message: impl ToString) -> StylesheetError {
        StylesheetError::Xml {
            position: self.position(),
            message: message.to_string(),
        }
    }

    fn run(mut self) -> Result<Stylesheet, StylesheetError> {
        let mut container_name = None;
        let mut container_start: Option<usize> = None;
        let mut container_end: Option<usize> = None;
        // Element depth inside the container; 1 means directly inside it.
        let mut depth = 0usize;
        let mut pending: Option<PendingTag> = None;
        let mut tags = Vec::new();
        let mut comments = Vec::new();

        loop {
            let start = self.position();
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(e) => return Err(self.xml_error(e)),
            };
            let inside = container_start.is_some() && container_end.is_none();

            match event {
                Event::Start(e) => {
                    if inside {
                        if depth == 1 {
                            pending = Some(PendingTag {
                                tag: self.tag_from(&e)?,
                                start,
                            });
                        }
                        depth += 1;
                    } else if container_start.is_none() && is_container(&e) {
                        container_name = self.attribute_value(&e, "name")?;
                        container_start = Some(start);
                        depth = 1;
                    }
                }
                Event::Empty(e) => {
                    if inside {
                        if depth == 1 {
                            let mut tag = self.tag_from(&e)?;
                            tag.source = self.source[start..self.position()].to_string();
                            tags.push(tag);
                        }
                    } else if container_start.is_none() && is_container(&e) {
                        container_name = self.attribute_value(&e, "name")?;
                        container_start = Some(start);
                        container_end = Some(self.position());
                    }
                }
                Event::End(_) => {
                    if inside {
                        depth -= 1;
                        if depth == 1 {
                            if let Some(PendingTag { mut tag, start }) = pending.take() {
                                tag.source = self.source[start..self.position()].to_string();
                                tags.push(tag);
                            }
                        } else if depth == 0 {
                            container_end = Some(self.position());
                        }
                    }
                }
                Event::Comment(text) => {
                    comments.push(String::from_utf8_lossy(text.as_ref()).into_owned());
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let start = container_start.ok_or(StylesheetError::MissingContainer)?;
        let end = container_end.ok_or(StylesheetError::UnclosedContainer)?;

        Ok(Stylesheet {
            name: container_name,
            container: self.source[start..end].to_string(),
            tags,
            comments,
        })
    }

    fn tag_from(&self, e: &BytesStart<'_>) -> Result<StyleTag, StylesheetError> {
        let tag_type = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| self.xml_error(err))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| self.xml_error(err))?
                .into_owned();
            attributes.push((key, value));
        }
        let name = attributes
            .iter()
            .find(|(k, _)| k == "name")
            .map(|(_, v)| v.clone());

        Ok(StyleTag {
            tag_type,
            name,
            attributes,
            source: String::new(),
        })
    }

    fn attribute_value(
        &self,
        e: &BytesStart<'_>,
        key: &str,
    ) -> Result<Option<String>, StylesheetError> {
        let attr = e
            .try_get_attribute(key)
            .map_err(|err| self.xml_error(err))?;
        match attr {
            Some(attr) => {
                let value = attr.unescape_value().map_err(|err| self.xml_error(err))?;
                Ok(Some(value.into_owned()))
            }
            None => Ok(None),
        }
    }
}

fn is_container(e: &BytesStart<'_>) -> bool {
    e.name().as_ref() == STYLE_CONTAINER.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<!DOCTYPE ipestyle SYSTEM "ipe.dtd">
<!--
TITLE: Sample styles
DESC: A small sample.
-->
<ipestyle name="sample">
<symbol name="mark/disk(sx)" transformations="translations">
<path fill="sym-stroke">
0.6 0 0 0.6 0 0 e
</path>
</symbol>
<dashstyle name="dotted" value="[1 3] 0"/>
<color name="navy" value="0 0 0.5"/>
<layout paper="595 842" origin="0 0" frame="595 842"/>
</ipestyle>
"#;

    #[test]
    fn test_parse_tags_in_order() {
        let sheet = Stylesheet::parse(SAMPLE).unwrap();
        let types: Vec<&str> = sheet.tags().iter().map(|t| t.tag_type()).collect();
        assert_eq!(types, vec!["symbol", "dashstyle", "color", "layout"]);

        let names: Vec<Option<&str>> = sheet.tags().iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec![Some("mark/disk(sx)"), Some("dotted"), Some("navy"), None]
        );
    }

    #[test]
    fn test_parse_container_source() {
        let sheet = Stylesheet::parse(SAMPLE).unwrap();
        assert_eq!(sheet.name(), Some("sample"));
        assert!(sheet.container().starts_with("<ipestyle name=\"sample\">"));
        assert!(sheet.container().ends_with("</ipestyle>"));
    }

    #[test]
    fn test_tag_source_is_verbatim() {
        let sheet = Stylesheet::parse(SAMPLE).unwrap();
        let symbol = &sheet.tags()[0];
        assert!(symbol.source().starts_with("<symbol name=\"mark/disk(sx)\""));
        assert!(symbol.source().ends_with("</symbol>"));
        assert!(symbol.source().contains("0.6 0 0 0.6 0 0 e"));

        let dash = &sheet.tags()[1];
        assert_eq!(dash.source(), r#"<dashstyle name="dotted" value="[1 3] 0"/>"#);
        assert_eq!(dash.attribute("value"), Some("[1 3] 0"));
    }

    #[test]
    fn test_parse_comments() {
        let sheet = Stylesheet::parse(SAMPLE).unwrap();
        assert_eq!(sheet.comments().len(), 1);
        assert!(sheet.comments()[0].contains("TITLE: Sample styles"));
    }

    #[test]
    fn test_container_nested_in_document() {
        let source = r#"<ipe version="70218"><ipestyle name="inner"><color name="red" value="1 0 0"/></ipestyle><page/></ipe>"#;
        let sheet = Stylesheet::parse(source).unwrap();
        assert_eq!(sheet.name(), Some("inner"));
        assert_eq!(sheet.tags().len(), 1);
    }

    #[test]
    fn test_empty_container() {
        let sheet = Stylesheet::parse(r#"<ipestyle name="empty"/>"#).unwrap();
        assert!(sheet.tags().is_empty());
        assert_eq!(sheet.container(), r#"<ipestyle name="empty"/>"#);
    }

    #[test]
    fn test_escaped_names_are_unescaped() {
        let sheet =
            Stylesheet::parse(r#"<ipestyle><color name="a&amp;b" value="0"/></ipestyle>"#).unwrap();
        assert_eq!(sheet.tags()[0].name(), Some("a&b"));
    }

    #[test]
    fn test_missing_container() {
        let result = Stylesheet::parse("<root><color name=\"x\"/></root>");
        assert_eq!(result, Err(StylesheetError::MissingContainer));
    }

    #[test]
    fn test_malformed_xml() {
        let result = Stylesheet::parse("<ipestyle><color name=\"x\"></ipestyle>");
        assert!(matches!(result, Err(StylesheetError::Xml { .. })));
    }

    #[test]
    fn test_unclosed_container() {
        let result = Stylesheet::parse("<ipestyle><color name=\"x\"/>");
        assert!(result.is_err());
    }

    #[test]
    fn test_style_tag_new() {
        let tag = StyleTag::new("symbol", Some("mark/disk"));
        assert_eq!(tag.tag_type(), "symbol");
        assert_eq!(tag.name(), Some("mark/disk"));
        assert_eq!(tag.attribute("name"), Some("mark/disk"));
    }
}
