//! GlyphXML - Lightweight markup parsing for font files
//!
//! Pipeline:
//! 1. Encoding: byte order mark sniffing, 1/2/4-byte code units
//! 2. Tokenizer: flat token stream with entity expansion
//! 3. Builder: recursive descent into an owned document tree
//! 4. DTD: element content models answering "may this child repeat?"
//!
//! ```
//! use glyphxml::Document;
//!
//! let doc = Document::parse(br#"<font id="F1"><glyph unicode="A"/></font>"#).unwrap();
//! let font = doc.root_element().unwrap();
//! assert_eq!(font.attribute("id"), Some("F1"));
//! assert_eq!(font.child_element_count(), 1);
//! ```

pub mod core;
pub mod dom;
pub mod error;
pub mod loader;
pub mod parser;
pub mod strategy;

pub use crate::core::content_model::{ContentModelNode, Modifier, SequenceType};
pub use crate::core::dtd::{ContentCategory, DocType, DocTypeElement};
pub use crate::core::encoding::Encoding;
pub use crate::dom::{Document, Element, FromAttribute, Node, NodeKind};
pub use crate::error::{ErrorKind, ParseError, ParseErrors};
pub use crate::loader::{DirectoryLoader, MemoryLoader, ResourceLoader};
pub use crate::parser::{Parser, DEFAULT_MAX_DEPTH};

#[cfg(feature = "loader-cache")]
pub use crate::loader::CachedLoader;

#[cfg(feature = "parallel")]
pub use crate::strategy::parallel::parse_batch;

// ============================================================================
// Convenience Entry Points
// ============================================================================

/// Parse a document with default settings and no resource loader
pub fn parse(input: &[u8]) -> Result<Document, ParseErrors> {
    Parser::new().parse(input)
}

/// Parse a document, resolving external DTDs through `loader`
pub fn parse_with_loader(
    input: &[u8],
    loader: &dyn ResourceLoader,
) -> Result<Document, ParseErrors> {
    Parser::new().with_loader(loader).parse(input)
}

/// Parse a standalone DTD
pub fn parse_dtd(input: &[u8]) -> Result<DocType, ParseErrors> {
    DocType::parse(input)
}
