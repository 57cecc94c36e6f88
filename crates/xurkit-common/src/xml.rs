//! Small owned XML tree.
//!
//! Both schema files and XUI documents are small enough to load whole, so
//! readers parse into an [`XmlNode`] tree first and interpret it afterwards.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::{Error, Result};

/// Deepest element nesting [`parse_document`] accepts.
pub const MAX_ELEMENT_DEPTH: usize = 1024;

/// An XML element with its attributes, text content and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Tag name of the element.
    pub tag: String,
    /// Concatenated text content, whitespace preserved.
    pub text: String,
    /// Attributes as key-value pairs, in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements.
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Create a new node with the given tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set the text content of this node.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add an attribute to this node.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Add a child node.
    pub fn child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Look up an attribute value by name.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First child element with the given tag.
    pub fn find(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// All child elements with the given tag.
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Trimmed text of the first child element with the given tag.
    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.find(tag).map(|c| c.text.trim())
    }
}

/// Parse XML text into a node tree, returning the root element.
pub fn parse_document(xml: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.len() >= MAX_ELEMENT_DEPTH {
                    return Err(Error::Xml(format!(
                        "elements nested deeper than {} levels",
                        MAX_ELEMENT_DEPTH
                    )));
                }
                let mut node = XmlNode::new(String::from_utf8_lossy(e.name().as_ref()));
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let value = attr
                        .unescape_value()
                        .map_err(|e| Error::Xml(e.to_string()))?
                        .into_owned();
                    node.attributes.push((key, value));
                }
                stack.push(node);
            }
            Ok(Event::Empty(e)) => {
                // Self-closing element
                let mut node = XmlNode::new(String::from_utf8_lossy(e.name().as_ref()));
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let value = attr
                        .unescape_value()
                        .map_err(|e| Error::Xml(e.to_string()))?
                        .into_owned();
                    node.attributes.push((key, value));
                }
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::End(_)) => {
                if let Some(node) = stack.pop() {
                    attach(&mut stack, &mut root, node)?;
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(node) = stack.last_mut() {
                    let text = e.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                    node.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // Declarations, comments, processing instructions
            Err(e) => return Err(Error::Xml(format!("XML parse error: {}", e))),
        }
    }

    if !stack.is_empty() {
        return Err(Error::Xml("unclosed element at end of document".to_string()));
    }

    root.ok_or_else(|| Error::Xml("no root element found in XML".to_string()))
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root.is_some() {
        return Err(Error::Xml("multiple root elements".to_string()));
    } else {
        *root = Some(node);
    }
    Ok(())
}
