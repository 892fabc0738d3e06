//! Minimal owned XML tree for in-place KML surgery
//!
//! quick-xml is an event streamer; the aggregation pass mutates folders and
//! relocates children between them, so the event stream is first materialized
//! into an owned tree, edited, and written back out. Attributes (including
//! namespace declarations) pass through untouched. Comments, processing
//! instructions and doctype nodes carry no structure the aggregator needs and
//! are dropped.

use crate::error::{KmlFreqError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// A node in the parsed document: an element or a text run
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// Nested element
    Element(XmlElement),
    /// Unescaped character data
    Text(String),
}

/// An XML element with its attributes and ordered children
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Tag name as written in the document (no namespace expansion)
    pub name: String,
    /// Attributes in document order, unescaped
    pub attrs: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element with the given tag name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// First child element with the given tag name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find_map(|node| match node {
            XmlNode::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// Mutable variant of [`XmlElement::child`]
    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find_map(|node| match node {
            XmlNode::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// Concatenated text content directly under this element
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Replace this element's text content, keeping any element children
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.retain(|c| !matches!(c, XmlNode::Text(_)));
        self.children.insert(0, XmlNode::Text(text.into()));
    }

    /// Text of the `name` child, i.e. the display name of a KML feature
    pub fn display_name(&self) -> Option<String> {
        self.child("name").map(XmlElement::text)
    }
}

/// Parse an XML byte stream into an owned tree
///
/// # Errors
///
/// Returns [`KmlFreqError::Xml`] if the document is not well-formed and
/// [`KmlFreqError::InvalidStructure`] if it has no root element.
#[must_use = "this function returns the parsed tree that should be processed"]
pub fn parse(bytes: &[u8]) -> Result<XmlElement> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                stack.push(element_from_start(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let el = element_from_start(&e)?;
                attach(&mut stack, &mut root, el)?;
            }
            Ok(Event::End(_)) => {
                let el = stack.pop().ok_or_else(|| {
                    KmlFreqError::InvalidStructure("unbalanced closing tag".to_string())
                })?;
                attach(&mut stack, &mut root, el)?;
            }
            Ok(Event::Text(e)) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(e.unescape()?.into_owned()));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    parent.children.push(XmlNode::Text(text));
                }
            }
            Ok(Event::Eof) => break,
            // declarations, comments, PIs and doctype carry no tree structure
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(KmlFreqError::InvalidStructure(
            "unclosed element at end of document".to_string(),
        ));
    }
    root.ok_or_else(|| KmlFreqError::InvalidStructure("document has no root element".to_string()))
}

/// Serialize a tree back to bytes with an explicit UTF-8 XML declaration
///
/// # Errors
///
/// Returns an error if writing an event fails.
#[must_use = "this function returns serialized bytes that should be written out"]
pub fn serialize(root: &XmlElement) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)?;
    Ok(writer.into_inner())
}

fn element_from_start(start: &BytesStart) -> Result<XmlElement> {
    let mut el = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::InvalidAttr)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        el.attrs.push((key, value));
    }
    Ok(el)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, el: XmlElement) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(el)),
        None => {
            if root.is_some() {
                return Err(KmlFreqError::InvalidStructure(
                    "multiple root elements".to_string(),
                ));
            }
            *root = Some(el);
        }
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &el.children {
        match child {
            XmlNode::Element(e) => write_element(writer, e)?,
            XmlNode::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    Ok(())
}
