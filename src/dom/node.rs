//! Document Tree Nodes
//!
//! A node is an element, a text run or a comment. Each element owns its
//! children directly; the tree has no back-references.

use std::fmt;
use std::ops::ControlFlow;

use super::element::Element;
use super::writer;

/// Type of node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
}

/// A node in the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    #[inline]
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Element(_) => NodeKind::Element,
            Node::Text(_) => NodeKind::Text,
            Node::Comment(_) => NodeKind::Comment,
        }
    }

    /// Tag name for elements, content for text and comments
    #[inline]
    pub fn value(&self) -> &str {
        match self {
            Node::Element(element) => element.name(),
            Node::Text(text) | Node::Comment(text) => text,
        }
    }

    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Visit direct children whose value equals `name` (all if empty)
    ///
    /// Text and comment nodes have no children.
    pub fn find_children<F>(&self, name: &str, visitor: F)
    where
        F: FnMut(&Node) -> ControlFlow<()>,
    {
        if let Node::Element(element) = self {
            element.find_children(name, visitor);
        }
    }

    /// Visit direct child elements named `name` (all if empty)
    pub fn find_elements<F>(&self, name: &str, visitor: F)
    where
        F: FnMut(&Element) -> ControlFlow<()>,
    {
        if let Node::Element(element) = self {
            element.find_elements(name, visitor);
        }
    }

    /// Serialize as markup; a negative indent disables indentation
    pub fn write<W: fmt::Write>(&self, out: &mut W, indent: i32) -> fmt::Result {
        match self {
            Node::Element(element) => element.write(out, indent),
            _ => writer::write_node(out, self, writer::depth_of(indent)),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}
