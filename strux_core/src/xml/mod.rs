//! # XML Tree
//!
//! A small ordered element tree sitting between the entity model and
//! `quick-xml`. Attributes and children keep the order they were pushed in;
//! the [`schema`] module decides what that order must be.
//!
//! Elements, attributes and leaf text are modelled. Comments and processing
//! instructions are skipped when parsing.
//!
//! ## Example
//!
//! ```rust
//! use strux_core::xml::XmlElement;
//!
//! let point = XmlElement::new("point").with_attr("x", 1.5).with_attr("y", 0.0).with_attr("z", -2.0);
//! let contour = XmlElement::new("contour").with_child(point);
//!
//! let text = contour.to_xml_string()?;
//! let parsed = XmlElement::parse(&text)?;
//!
//! assert_eq!(parsed, contour);
//! assert_eq!(parsed.required_child("point")?.parse_attr::<f64>("x")?, 1.5);
//! # Ok::<(), strux_core::errors::StruxError>(())
//! ```

pub mod schema;

use std::fmt::Display;
use std::io::Cursor;
use std::str::FromStr;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::{StruxError, StruxResult};

/// Element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Text content of a leaf element
    pub text: Option<String>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    // ========================================================================
    // Building
    // ========================================================================

    /// Add an attribute (builder pattern)
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.push_attr(key, value);
        self
    }

    /// Add an attribute only when `value` is present
    pub fn with_opt_attr<T: Display>(mut self, key: impl Into<String>, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.push_attr(key, value);
        }
        self
    }

    pub fn push_attr(&mut self, key: impl Into<String>, value: impl Display) {
        self.attributes.push((key.into(), value.to_string()));
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlElement>) -> Self {
        self.children.extend(children);
        self
    }

    /// Set the text content (builder pattern)
    pub fn with_text(mut self, text: impl Display) -> Self {
        self.text = Some(text.to_string());
        self
    }

    // ========================================================================
    // Reading
    // ========================================================================

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn required_attr(&self, key: &str) -> StruxResult<&str> {
        self.attr(key)
            .ok_or_else(|| StruxError::missing_attribute(key, &self.name))
    }

    /// Parse a required attribute
    pub fn parse_attr<T>(&self, key: &str) -> StruxResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.required_attr(key)?;
        self.parse_value(key, raw)
    }

    /// Parse an attribute that may be absent
    pub fn parse_opt_attr<T>(&self, key: &str) -> StruxResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.attr(key).map(|raw| self.parse_value(key, raw)).transpose()
    }

    fn parse_value<T>(&self, key: &str, raw: &str) -> StruxResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        raw.parse().map_err(|e: T::Err| {
            StruxError::xml(format!(
                "invalid value '{}' for attribute '{}' on <{}>: {}",
                raw, key, self.name, e
            ))
        })
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn required_child(&self, name: &str) -> StruxResult<&XmlElement> {
        self.child(name)
            .ok_or_else(|| StruxError::missing_element(name, &self.name))
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    // ========================================================================
    // Text form
    // ========================================================================

    /// Write as a UTF-8 document with declaration, indented by two spaces
    pub fn to_xml_string(&self) -> StruxResult<String> {
        let mut buffer = Vec::new();
        let mut writer = Writer::new_with_indent(Cursor::new(&mut buffer), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| StruxError::xml(format!("failed to write XML declaration: {e}")))?;
        write_element(&mut writer, self)?;
        String::from_utf8(buffer).map_err(|e| StruxError::xml(format!("written XML is not UTF-8: {e}")))
    }

    /// Parse a document and return its root element
    pub fn parse(content: &str) -> StruxResult<XmlElement> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    stack.push(start_element(e)?);
                }
                Ok(Event::Empty(ref e)) => {
                    let element = start_element(e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(ref e)) => {
                    let element = stack.pop().ok_or_else(|| {
                        StruxError::xml(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        ))
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(ref t)) => {
                    if let Some(open) = stack.last_mut() {
                        let text = t
                            .unescape()
                            .map_err(|e| StruxError::xml(format!("invalid text in <{}>: {e}", open.name)))?;
                        open.text = Some(text.into_owned());
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(StruxError::xml(format!(
                        "error at position {}: {e}",
                        reader.error_position()
                    )));
                }
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(StruxError::xml(format!("element <{}> is never closed", open.name)));
        }
        root.ok_or_else(|| StruxError::xml("document has no root element"))
    }
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &XmlElement) -> StruxResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if let (true, Some(text)) = (element.children.is_empty(), &element.text) {
        writer
            .write_event(Event::Start(start))
            .map_err(|e| StruxError::xml(format!("failed to write <{}>: {e}", element.name)))?;
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| StruxError::xml(format!("failed to write text of <{}>: {e}", element.name)))?;
        return writer
            .write_event(Event::End(BytesEnd::new(element.name.as_str())))
            .map_err(|e| StruxError::xml(format!("failed to close <{}>: {e}", element.name)));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| StruxError::xml(format!("failed to write <{}>: {e}", element.name)));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| StruxError::xml(format!("failed to write <{}>: {e}", element.name)))?;
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| StruxError::xml(format!("failed to close <{}>: {e}", element.name)))
}

fn start_element(e: &BytesStart<'_>) -> StruxResult<XmlElement> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|err| StruxError::xml(format!("invalid UTF-8 in element name: {err}")))?
        .to_string();

    let mut element = XmlElement::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| StruxError::xml(format!("malformed attribute on <{}>: {err}", element.name)))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| StruxError::xml(format!("invalid UTF-8 in attribute name: {err}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| StruxError::xml(format!("invalid value for '{}' on <{}>: {err}", key, element.name)))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> StruxResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(StruxError::xml(format!(
                "second root element <{}> after <{}>",
                element.name,
                root.as_ref().map(|r| r.name.as_str()).unwrap_or_default()
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_escaping() {
        let e = XmlElement::new("load_case").with_attr("name", "Snow & \"ice\" <drift>");
        let text = e.to_xml_string().unwrap();
        assert!(text.contains("&amp;"));
        let parsed = XmlElement::parse(&text).unwrap();
        assert_eq!(parsed.attr("name"), Some("Snow & \"ice\" <drift>"));
    }

    #[test]
    fn test_nested_structure_and_order() {
        let doc = XmlElement::new("region").with_child(
            XmlElement::new("contour")
                .with_child(XmlElement::new("edge").with_attr("type", "line"))
                .with_child(XmlElement::new("edge").with_attr("type", "arc")),
        );
        let parsed = XmlElement::parse(&doc.to_xml_string().unwrap()).unwrap();
        let contour = parsed.required_child("contour").unwrap();
        let types: Vec<_> = contour.children_named("edge").map(|e| e.attr("type").unwrap()).collect();
        assert_eq!(types, vec!["line", "arc"]);
    }

    #[test]
    fn test_declaration_and_indent() {
        let doc = XmlElement::new("database").with_child(XmlElement::new("end"));
        let text = doc.to_xml_string().unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("\n  <end/>"));
    }

    #[test]
    fn test_missing_attribute_and_element() {
        let e = XmlElement::new("point").with_attr("x", 1.0);
        assert_eq!(
            e.parse_attr::<f64>("y").unwrap_err(),
            StruxError::missing_attribute("y", "point")
        );
        assert_eq!(e.required_child("normal").unwrap_err().error_code(), "MISSING_ELEMENT");
        assert_eq!(e.parse_opt_attr::<f64>("y").unwrap(), None);
    }

    #[test]
    fn test_bad_number_is_parse_error() {
        let e = XmlElement::new("point").with_attr("x", "one");
        assert_eq!(e.parse_attr::<f64>("x").unwrap_err().error_code(), "XML_PARSE");
    }

    #[test]
    fn test_malformed_documents() {
        assert!(XmlElement::parse("").is_err());
        assert!(XmlElement::parse("<a><b></a>").is_err());
        assert!(XmlElement::parse("<a/><b/>").is_err());
        assert!(XmlElement::parse("<a>").is_err());
    }

    #[test]
    fn test_leaf_text_round_trips() {
        let doc = XmlElement::new("header").with_child(XmlElement::new("title").with_text("Job <1>"));
        let text = doc.to_xml_string().unwrap();
        assert!(text.contains("<title>Job &lt;1&gt;</title>"));
        let parsed = XmlElement::parse(&text).unwrap();
        assert_eq!(parsed.required_child("title").unwrap().text.as_deref(), Some("Job <1>"));
    }

    #[test]
    fn test_float_text_round_trips() {
        let value = 0.1 + 0.2;
        let e = XmlElement::new("p").with_attr("v", value);
        let parsed = XmlElement::parse(&e.to_xml_string().unwrap()).unwrap();
        assert_eq!(parsed.parse_attr::<f64>("v").unwrap(), value);
    }
}
