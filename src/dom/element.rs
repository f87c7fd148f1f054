//! Element Nodes
//!
//! An element owns its attribute map and its ordered children. All
//! queries look at direct children only; callers walk deeper themselves.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::ControlFlow;

use super::attribute::FromAttribute;
use super::node::{Node, NodeKind};
use super::writer;

/// An element: tag name, attributes and child nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    // ========================================================================
    // Children
    // ========================================================================

    /// Child nodes in document order
    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Append a child node
    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    /// First direct child element named `name`
    pub fn get_element(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    pub fn get_element_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find(|element| element.name == name)
    }

    /// First direct child of the given kind
    pub fn first_of(&self, kind: NodeKind) -> Option<&Node> {
        self.children.iter().find(|node| node.kind() == kind)
    }

    pub fn child_element_count(&self) -> usize {
        self.elements().count()
    }

    /// Child elements carrying attributes or, recursively, such children
    pub fn non_empty_child_element_count(&self) -> usize {
        self.elements()
            .filter(|element| {
                element.attribute_count() > 0 || element.non_empty_child_element_count() > 0
            })
            .count()
    }

    /// Visit children whose value equals `name` (all if empty) until
    /// the visitor breaks
    pub fn find_children<F>(&self, name: &str, mut visitor: F)
    where
        F: FnMut(&Node) -> ControlFlow<()>,
    {
        for child in &self.children {
            if (name.is_empty() || child.value() == name) && visitor(child).is_break() {
                break;
            }
        }
    }

    /// Visit child elements named `name` (all if empty) until the
    /// visitor breaks
    pub fn find_elements<F>(&self, name: &str, mut visitor: F)
    where
        F: FnMut(&Element) -> ControlFlow<()>,
    {
        for element in self.elements() {
            if (name.is_empty() || element.name == name) && visitor(element).is_break() {
                break;
            }
        }
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Raw attribute value
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute coerced to `T`; `None` only when the attribute is absent
    pub fn get_attribute<T: FromAttribute>(&self, name: &str) -> Option<T> {
        self.attribute(name).map(T::from_attribute)
    }

    #[inline]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attributes sorted by name
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn for_each_attribute<F>(&self, mut visitor: F)
    where
        F: FnMut(&str, &str) -> ControlFlow<()>,
    {
        for (name, value) in self.attributes() {
            if visitor(name, value).is_break() {
                break;
            }
        }
    }

    #[inline]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl ToString) {
        self.attributes.insert(name.into(), value.to_string());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    // ========================================================================
    // Text
    // ========================================================================

    /// Concatenated direct text children; `None` if there are none
    pub fn get_text(&self) -> Option<String> {
        let mut texts = self.children.iter().filter_map(|node| match node {
            Node::Text(text) => Some(text.as_str()),
            _ => None,
        });
        let first = texts.next()?;
        Some(texts.fold(first.to_string(), |mut acc, text| {
            acc.push_str(text);
            acc
        }))
    }

    /// Text of the first child element named `name`
    pub fn get_element_text(&self, name: &str) -> Option<String> {
        self.get_element(name)?.get_text()
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Serialize as markup
    ///
    /// A negative `indent` writes only the children, flush left, with no
    /// enclosing tags.
    pub fn write<W: fmt::Write>(&self, out: &mut W, indent: i32) -> fmt::Result {
        match writer::depth_of(indent) {
            Some(depth) => writer::write_element(out, self, Some(depth)),
            None => writer::write_children(out, self, None),
        }
    }

    pub fn to_xml_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, 0)
    }
}
