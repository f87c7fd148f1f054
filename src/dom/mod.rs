//! Document Tree
//!
//! The in-memory result of a parse:
//! - Node: element, text or comment
//! - Element: tag name, attribute map and owned children
//! - Attribute: typed coercion of raw attribute values
//! - Document: top-level container plus prolog information
//! - Writer: markup serialization
//! - Builder: recursive-descent construction from tokens

pub mod attribute;
pub(crate) mod builder;
pub mod document;
pub mod element;
pub mod node;
pub(crate) mod writer;

pub use attribute::FromAttribute;
pub use document::Document;
pub use element::Element;
pub use node::{Node, NodeKind};
