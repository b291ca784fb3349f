//! Deterministic serializer for the document tree.
//!
//! Layout rules:
//! - one fixed XML declaration line
//! - attributes in alphabetical order
//! - childless elements written self-closing as `<name a="v" />`
//! - mixed content (non-whitespace text or CDATA) written inline, untouched
//! - whitespace-only elements below the root written inline, untouched
//! - everything else re-indented, one child per line; a root left with only
//!   whitespace becomes `<widget>` EOL `</widget>`
//! - every line ends with the configured terminator

use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};

use crate::node::{Element, Node};

/// Declaration line emitted at the top of every written document.
pub const DECLARATION: &str = "<?xml version='1.0' encoding='utf-8'?>";

/// Default spaces per nesting level.
pub const DEFAULT_INDENT: usize = 4;

/// Line terminator used when writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// The platform terminator (`\r\n` on Windows, `\n` elsewhere).
    #[default]
    Native,
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Native => {
                if cfg!(windows) {
                    "\r\n"
                } else {
                    "\n"
                }
            }
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

impl std::str::FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(LineEnding::Native),
            "lf" => Ok(LineEnding::Lf),
            "crlf" => Ok(LineEnding::CrLf),
            other => Err(format!("unknown line ending: {} (expected native, lf or crlf)", other)),
        }
    }
}

/// Output formatting options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    /// Spaces per nesting level
    pub indent: usize,

    /// Line terminator
    pub line_ending: LineEnding,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            line_ending: LineEnding::Native,
        }
    }
}

pub(crate) fn write_document(
    prolog: &[Node],
    root: &Element,
    epilog: &[Node],
    format: &Format,
) -> String {
    let eol = format.line_ending.as_str();
    let mut out = String::new();

    out.push_str(DECLARATION);
    out.push_str(eol);

    for node in prolog.iter().filter(|n| !n.is_whitespace()) {
        write_node(&mut out, node, 0, format);
        out.push_str(eol);
    }

    write_element(&mut out, root, 0, format);
    out.push_str(eol);

    for node in epilog.iter().filter(|n| !n.is_whitespace()) {
        write_node(&mut out, node, 0, format);
        out.push_str(eol);
    }

    out
}

fn write_node(out: &mut String, node: &Node, depth: usize, format: &Format) {
    match node {
        Node::Element(element) => write_element(out, element, depth, format),
        Node::Text(raw)
        | Node::CData(raw)
        | Node::Comment(raw)
        | Node::ProcessingInstruction(raw)
        | Node::DocType(raw) => out.push_str(raw),
    }
}

fn write_element(out: &mut String, element: &Element, depth: usize, format: &Format) {
    write_start_tag(out, element);

    if element.children.is_empty() {
        out.push_str(" />");
        return;
    }
    out.push('>');

    // Below the root, whitespace-only content is text, not layout
    let reindent = !element.has_mixed_content()
        && (depth == 0 || element.children.iter().any(|n| !n.is_whitespace()));

    if !reindent {
        for child in &element.children {
            write_inline(out, child);
        }
    } else {
        let eol = format.line_ending.as_str();
        let child_indent = " ".repeat(format.indent * (depth + 1));
        for child in element.children.iter().filter(|n| !n.is_whitespace()) {
            out.push_str(eol);
            out.push_str(&child_indent);
            write_node(out, child, depth + 1, format);
        }
        out.push_str(eol);
        out.push_str(&" ".repeat(format.indent * depth));
    }

    write_end_tag(out, element);
}

/// Write a node exactly as its children read, with no layout changes.
fn write_inline(out: &mut String, node: &Node) {
    match node {
        Node::Element(element) => {
            write_start_tag(out, element);
            if element.children.is_empty() {
                out.push_str(" />");
                return;
            }
            out.push('>');
            for child in &element.children {
                write_inline(out, child);
            }
            write_end_tag(out, element);
        }
        Node::Text(raw)
        | Node::CData(raw)
        | Node::Comment(raw)
        | Node::ProcessingInstruction(raw)
        | Node::DocType(raw) => out.push_str(raw),
    }
}

fn write_start_tag(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }
}

fn write_end_tag(out: &mut String, element: &Element) {
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
