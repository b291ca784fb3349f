//! In-memory tree for a configuration document.
//!
//! Character data is kept in its raw (still escaped) form so text content
//! round-trips byte-for-byte. Attribute values are stored unescaped and are
//! escaped again on write.

use std::collections::BTreeMap;

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A child element.
    Element(Element),
    /// Raw character data, exactly as it appeared in the source.
    Text(String),
    /// A CDATA section including its `<![CDATA[ ... ]]>` markers.
    CData(String),
    /// A comment including its `<!-- ... -->` markers.
    Comment(String),
    /// A processing instruction including its `<? ... ?>` markers.
    ProcessingInstruction(String),
    /// A document type declaration including its `<!DOCTYPE ... >` markers.
    DocType(String),
}

impl Node {
    /// True for text nodes that only carry layout whitespace.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }

    /// True for nodes that make their parent mixed content.
    pub(crate) fn is_character_data(&self) -> bool {
        match self {
            Node::Text(text) => !text.trim().is_empty(),
            Node::CData(_) => true,
            _ => false,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// An XML element.
///
/// Attributes live in a `BTreeMap`, so iteration (and therefore
/// serialization) is always in alphabetical order of attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Iterate over direct child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// True if any direct child is non-whitespace text or CDATA.
    pub fn has_mixed_content(&self) -> bool {
        self.children.iter().any(Node::is_character_data)
    }
}
