//! Markup Serialization
//!
//! Elements open on their own line, indented with one tab per level;
//! childless elements self-close. Text is escaped and written without
//! indentation. A depth of `None` writes everything flush left.

use std::fmt::{self, Write};

use super::element::Element;
use super::node::Node;
use crate::core::entities::escape;

/// Map a signed starting indent to a depth; negative means unindented
#[inline]
pub(crate) fn depth_of(indent: i32) -> Option<usize> {
    usize::try_from(indent).ok()
}

fn tabs<W: Write>(out: &mut W, depth: Option<usize>) -> fmt::Result {
    for _ in 0..depth.unwrap_or(0) {
        out.write_char('\t')?;
    }
    Ok(())
}

pub(crate) fn write_node<W: Write>(out: &mut W, node: &Node, depth: Option<usize>) -> fmt::Result {
    match node {
        Node::Element(element) => write_element(out, element, depth),
        Node::Text(text) => writeln!(out, "{}", escape(text)),
        Node::Comment(comment) => {
            tabs(out, depth)?;
            writeln!(out, "<!--{comment}-->")
        }
    }
}

/// Write an element with its tags; an unnamed element (the document
/// container) writes only its children, at the same depth
pub(crate) fn write_element<W: Write>(
    out: &mut W,
    element: &Element,
    depth: Option<usize>,
) -> fmt::Result {
    if element.name().is_empty() {
        return write_children(out, element, depth);
    }

    tabs(out, depth)?;
    write!(out, "<{}", escape(element.name()))?;
    for (name, value) in element.attributes() {
        write!(out, " {}=\"{}\"", escape(name), escape(value))?;
    }

    if element.children().is_empty() {
        return out.write_str("/>\n");
    }
    out.write_str(">\n")?;
    write_children(out, element, depth.map(|d| d + 1))?;
    tabs(out, depth)?;
    writeln!(out, "</{}>", escape(element.name()))
}

pub(crate) fn write_children<W: Write>(
    out: &mut W,
    element: &Element,
    depth: Option<usize>,
) -> fmt::Result {
    element
        .children()
        .iter()
        .try_for_each(|child| write_node(out, child, depth))
}
