//! Reader and writer for Cordova `config.xml` descriptors.
//!
//! The document is parsed into an ordered tree rooted at `<widget>`, edited
//! through the access-origin primitives in [`ConfigXml`], and written back in
//! a deterministic layout (alphabetical attributes, fixed indentation, one
//! trailing line terminator).

mod access;
mod error;
mod node;
mod parser;
mod writer;

pub use access::{AccessChange, AccessEntry, ACCESS_ELEMENT, ORIGIN_ATTRIBUTE};
pub use error::ConfigXmlError;
pub use node::{Element, Node};
pub use writer::{Format, LineEnding, DECLARATION, DEFAULT_INDENT};

use std::fs;
use std::path::Path;

/// Name of the root container every Cordova descriptor must carry.
pub const ROOT_ELEMENT: &str = "widget";

/// A loaded, mutable `config.xml` document.
#[derive(Debug, Clone)]
pub struct ConfigXml {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
    format: Format,
    dirty: bool,
}

impl ConfigXml {
    /// Parse a document from text.
    pub fn parse(text: &str) -> Result<Self, ConfigXmlError> {
        let parsed = parser::parse_document(text)?;
        tracing::trace!(
            children = parsed.root.children.len(),
            "parsed config document"
        );
        Ok(Self {
            prolog: parsed.prolog,
            root: parsed.root,
            epilog: parsed.epilog,
            format: Format::default(),
            dirty: false,
        })
    }

    /// Load and parse a document from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigXmlError> {
        let bytes = fs::read(path)?;
        let text = String::from_utf8(bytes)?;
        Self::parse(&text)
    }

    /// Replace the output format.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// True once an edit has changed the tree since loading.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Serialize the whole document.
    pub fn to_xml_string(&self) -> String {
        writer::write_document(&self.prolog, &self.root, &self.epilog, &self.format)
    }
}
