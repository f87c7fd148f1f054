//! Parsed Document
//!
//! The document is an unnamed container element holding the top-level
//! nodes, plus what the prolog declared: the `<?xml?>` version and
//! encoding, the DOCTYPE with its element declarations, and any warnings
//! raised while resolving external DTD content.

use std::fmt;
use std::io;
use std::ops::ControlFlow;

use super::element::Element;
use super::node::Node;
use crate::core::dtd::DocType;
use crate::core::encoding::Encoding;
use crate::error::ParseErrors;
use crate::parser::Parser;

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// A parsed markup document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub(crate) root: Element,
    pub(crate) version: Option<String>,
    pub(crate) declared_encoding: Option<String>,
    pub(crate) source_encoding: Encoding,
    pub(crate) doctype: Option<DocType>,
    pub(crate) warnings: Vec<String>,
}

impl Document {
    /// Parse with default settings and no resource loader
    pub fn parse(input: &[u8]) -> Result<Self, ParseErrors> {
        Parser::new().parse(input)
    }

    /// An empty document, for building trees programmatically
    pub fn new() -> Self {
        Self::default()
    }

    /// The implicit container of the top-level nodes
    #[inline]
    pub fn root(&self) -> &Element {
        &self.root
    }

    #[inline]
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// First top-level element
    pub fn root_element(&self) -> Option<&Element> {
        self.root.elements().next()
    }

    /// `version` from the XML declaration
    pub fn xml_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// `encoding` from the XML declaration, as written
    pub fn encoding(&self) -> Option<&str> {
        self.declared_encoding.as_deref()
    }

    /// Encoding selected by the byte order mark
    #[inline]
    pub fn source_encoding(&self) -> Encoding {
        self.source_encoding
    }

    pub fn doctype(&self) -> Option<&DocType> {
        self.doctype.as_ref()
    }

    /// Non-fatal diagnostics, e.g. unreadable external DTDs
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Whether the DTD lets `child` repeat inside `parent`
    ///
    /// False without a DOCTYPE or a declaration for `parent`.
    pub fn is_element_an_array(&self, parent: &str, child: &str) -> bool {
        self.doctype
            .as_ref()
            .is_some_and(|doctype| doctype.is_element_an_array(parent, child))
    }

    pub fn find_children<F>(&self, name: &str, visitor: F)
    where
        F: FnMut(&Node) -> ControlFlow<()>,
    {
        self.root.find_children(name, visitor);
    }

    pub fn find_elements<F>(&self, name: &str, visitor: F)
    where
        F: FnMut(&Element) -> ControlFlow<()>,
    {
        self.root.find_elements(name, visitor);
    }

    pub fn get_element(&self, name: &str) -> Option<&Element> {
        self.root.get_element(name)
    }

    /// Serialize the top-level nodes
    pub fn write<W: fmt::Write>(&self, out: &mut W, indent: i32) -> fmt::Result {
        self.root.write(out, indent)
    }

    /// Write an XML declaration followed by the tree
    pub fn save<W: io::Write>(&self, mut out: W) -> io::Result<()> {
        out.write_all(DECLARATION.as_bytes())?;
        out.write_all(self.to_string().as_bytes())?;
        out.flush()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, 0)
    }
}
