//! quick-xml event reader that builds the document tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ConfigXmlError;
use crate::node::{Element, Node};
use crate::ROOT_ELEMENT;

/// A parsed document split around its root element.
#[derive(Debug)]
pub(crate) struct ParsedDocument {
    pub prolog: Vec<Node>,
    pub root: Element,
    pub epilog: Vec<Node>,
}

/// Parse `text` into a tree rooted at `<widget>`.
///
/// The XML declaration is not kept; the writer always emits its own.
pub(crate) fn parse_document(text: &str) -> Result<ParsedDocument, ConfigXmlError> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(false);
    reader.check_end_names(true);

    let mut builder = TreeBuilder::default();

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| ConfigXmlError::malformed(reader.buffer_position(), e))?;

        match event {
            Event::Start(start) => {
                let element = element_from_start(&start, position)?;
                builder.open(element)?;
            }
            Event::Empty(start) => {
                let element = element_from_start(&start, position)?;
                builder.attach(Node::Element(element))?;
            }
            Event::End(_) => {
                let element = builder
                    .stack
                    .pop()
                    .ok_or_else(|| ConfigXmlError::malformed(position, "unexpected closing tag"))?;
                builder.attach(Node::Element(element))?;
            }
            Event::Text(text) => {
                builder.attach(Node::Text(decode(&text, position)?.to_string()))?;
            }
            Event::CData(data) => {
                let raw = format!("<![CDATA[{}]]>", decode(&data, position)?);
                builder.attach(Node::CData(raw))?;
            }
            Event::Comment(comment) => {
                let raw = format!("<!--{}-->", decode(&comment, position)?);
                builder.attach(Node::Comment(raw))?;
            }
            Event::PI(pi) => {
                let raw = format!("<?{}?>", decode(&pi, position)?);
                builder.attach(Node::ProcessingInstruction(raw))?;
            }
            Event::DocType(doctype) => {
                let raw = format!("<!DOCTYPE {}>", decode(&doctype, position)?.trim());
                builder.attach(Node::DocType(raw))?;
            }
            Event::Decl(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = builder.stack.last() {
        return Err(ConfigXmlError::malformed(
            reader.buffer_position(),
            format!("unclosed element <{}>", open.name),
        ));
    }

    let root = builder.root.ok_or(ConfigXmlError::MissingRoot)?;
    if root.name != ROOT_ELEMENT {
        return Err(ConfigXmlError::UnexpectedRoot(root.name));
    }

    Ok(ParsedDocument {
        prolog: builder.prolog,
        root,
        epilog: builder.epilog,
    })
}

#[derive(Default)]
struct TreeBuilder {
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
    stack: Vec<Element>,
}

impl TreeBuilder {
    fn open(&mut self, element: Element) -> Result<(), ConfigXmlError> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(ConfigXmlError::MultipleRoots);
        }
        self.stack.push(element);
        Ok(())
    }

    /// Attach `node` to the open element, or place it around the root.
    ///
    /// Whitespace outside the root is dropped here; any other text there is
    /// an error.
    fn attach(&mut self, node: Node) -> Result<(), ConfigXmlError> {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
            return Ok(());
        }

        // Top level: outside any element
        match node {
            Node::Element(element) => {
                if self.root.is_some() {
                    return Err(ConfigXmlError::MultipleRoots);
                }
                self.root = Some(element);
            }
            Node::Text(ref text) if text.trim().is_empty() => {}
            Node::Text(_) | Node::CData(_) => return Err(ConfigXmlError::TextOutsideRoot),
            other => {
                if self.root.is_none() {
                    self.prolog.push(other);
                } else {
                    self.epilog.push(other);
                }
            }
        }
        Ok(())
    }
}

fn element_from_start(start: &BytesStart<'_>, position: usize) -> Result<Element, ConfigXmlError> {
    let name = decode(start.name().as_ref(), position)?.to_string();
    let mut element = Element::new(name);

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| ConfigXmlError::malformed(position, e))?;
        let key = decode(attribute.key.as_ref(), position)?.to_string();
        let value = attribute
            .unescape_value()
            .map_err(|e| ConfigXmlError::malformed(position, e))?
            .into_owned();
        element.attributes.insert(key, value);
    }

    Ok(element)
}

fn decode(bytes: &[u8], position: usize) -> Result<&str, ConfigXmlError> {
    std::str::from_utf8(bytes).map_err(|e| ConfigXmlError::malformed(position, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_widget() {
        let parsed = parse_document("<widget><access origin=\"*\" /></widget>").unwrap();
        assert_eq!(parsed.root.name, "widget");
        let access: Vec<_> = parsed.root.child_elements().collect();
        assert_eq!(access.len(), 1);
        assert_eq!(access[0].attribute("origin"), Some("*"));
    }

    #[test]
    fn test_declaration_and_layout_whitespace_dropped() {
        let text = "<?xml version='1.0' encoding='utf-8'?>\n<widget>\n</widget>\n";
        let parsed = parse_document(text).unwrap();
        assert!(parsed.prolog.is_empty());
        assert!(parsed.epilog.is_empty());
        assert_eq!(parsed.root.children, vec![Node::Text("\n".to_string())]);
    }

    #[test]
    fn test_attribute_values_are_unescaped() {
        let parsed =
            parse_document("<widget><access origin=\"http://a.com/?x=1&amp;y=2\" /></widget>")
                .unwrap();
        let access = parsed.root.child_elements().next().unwrap();
        assert_eq!(access.attribute("origin"), Some("http://a.com/?x=1&y=2"));
    }

    #[test]
    fn test_text_kept_raw() {
        let parsed = parse_document("<widget><name>Tom &amp; Jerry</name></widget>").unwrap();
        let name = parsed.root.child_elements().next().unwrap();
        assert_eq!(name.children, vec![Node::Text("Tom &amp; Jerry".to_string())]);
    }

    #[test]
    fn test_comments_outside_root_are_kept() {
        let parsed = parse_document("<!-- head --><widget/><!-- tail -->").unwrap();
        assert_eq!(parsed.prolog, vec![Node::Comment("<!-- head -->".to_string())]);
        assert_eq!(parsed.epilog, vec![Node::Comment("<!-- tail -->".to_string())]);
    }

    #[test]
    fn test_reject_empty_document() {
        let result = parse_document("");
        assert!(matches!(result, Err(ConfigXmlError::MissingRoot)));
    }

    #[test]
    fn test_reject_wrong_root() {
        let result = parse_document("<manifest></manifest>");
        assert!(matches!(result, Err(ConfigXmlError::UnexpectedRoot(name)) if name == "manifest"));
    }

    #[test]
    fn test_reject_multiple_roots() {
        let result = parse_document("<widget/><widget/>");
        assert!(matches!(result, Err(ConfigXmlError::MultipleRoots)));
    }

    #[test]
    fn test_reject_text_outside_root() {
        let result = parse_document("stray<widget/>");
        assert!(matches!(result, Err(ConfigXmlError::TextOutsideRoot)));
    }

    #[test]
    fn test_reject_mismatched_tags() {
        let result = parse_document("<widget><access></widget>");
        assert!(matches!(result, Err(ConfigXmlError::Malformed { .. })));
    }

    #[test]
    fn test_reject_unclosed_root() {
        let result = parse_document("<widget><access origin=\"*\"/>");
        assert!(matches!(result, Err(ConfigXmlError::Malformed { .. })));
    }

    #[test]
    fn test_reject_duplicate_attributes() {
        let result = parse_document("<widget><access origin=\"a\" origin=\"b\"/></widget>");
        assert!(matches!(result, Err(ConfigXmlError::Malformed { .. })));
    }
}
