//! DTD Element Declarations
//!
//! Collects `<!ELEMENT name model>` declarations from an internal subset
//! or an external DTD and answers which child elements may repeat.
//! ATTLIST, ENTITY and NOTATION declarations are skipped.

use std::collections::HashMap;

use super::content_model::{ContentModelNode, Modifier};
use super::cursor::TokenCursor;
use super::tokenizer::{tokenize, Token, TokenKind};
use crate::error::{ParseError, ParseErrors};

/// Declared content category of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCategory {
    /// `EMPTY`
    Empty,
    /// `ANY`
    Any,
    /// A parenthesized content model
    Children,
}

/// One `<!ELEMENT>` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTypeElement {
    name: String,
    category: ContentCategory,
    model: ContentModelNode,
}

impl DocTypeElement {
    /// Build a declaration from its name and raw content text
    pub fn parse(name: impl Into<String>, content: &str) -> Result<Self, ParseError> {
        let name = name.into();
        let (category, model) = match content.trim() {
            "EMPTY" => (ContentCategory::Empty, ContentModelNode::empty()),
            "ANY" => (ContentCategory::Any, ContentModelNode::empty()),
            model => (ContentCategory::Children, ContentModelNode::parse(model)?),
        };
        Ok(DocTypeElement {
            name,
            category,
            model,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn category(&self) -> ContentCategory {
        self.category
    }

    /// Root group of the content model (empty for EMPTY and ANY)
    #[inline]
    pub fn model(&self) -> &ContentModelNode {
        &self.model
    }

    /// Whether `child` may occur more than once inside this element
    pub fn is_array(&self, child: &str) -> bool {
        !child.is_empty() && self.model.is_array(child)
    }

    pub fn modifier_of(&self, child: &str) -> Option<Modifier> {
        self.model.modifier_of(child)
    }
}

/// A document type declaration and its element declarations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocType {
    name: String,
    public_id: Option<String>,
    system_id: Option<String>,
    elements: HashMap<String, DocTypeElement>,
}

impl DocType {
    pub fn new(name: impl Into<String>) -> Self {
        DocType {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a standalone DTD (the contents of an external subset)
    pub fn parse(input: &[u8]) -> Result<Self, ParseErrors> {
        let mut doctype = DocType::default();
        doctype.parse_external(input)?;
        Ok(doctype)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_id(&self) -> Option<&str> {
        self.public_id.as_deref()
    }

    pub fn system_id(&self) -> Option<&str> {
        self.system_id.as_deref()
    }

    pub(crate) fn set_public_id(&mut self, id: impl Into<String>) {
        self.public_id = Some(id.into());
    }

    pub(crate) fn set_system_id(&mut self, id: impl Into<String>) {
        self.system_id = Some(id.into());
    }

    /// Register a declaration, replacing any earlier one of the same name
    pub fn add_element(&mut self, element: DocTypeElement) {
        self.elements.insert(element.name.clone(), element);
    }

    pub fn element(&self, name: &str) -> Option<&DocTypeElement> {
        self.elements.get(name)
    }

    pub fn elements(&self) -> impl Iterator<Item = &DocTypeElement> {
        self.elements.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether `child` may repeat inside `parent`
    ///
    /// False when `parent` is undeclared.
    pub fn is_element_an_array(&self, parent: &str, child: &str) -> bool {
        self.elements
            .get(parent)
            .is_some_and(|element| element.is_array(child))
    }

    /// Tokenize and parse a DTD buffer into this doctype
    pub(crate) fn parse_external(&mut self, input: &[u8]) -> Result<(), ParseErrors> {
        let tokens = tokenize(input)?;
        parse_declarations(&tokens, self)?;
        Ok(())
    }
}

/// Parse a DTD token stream, adding each element declaration to `doctype`
pub(crate) fn parse_declarations(
    tokens: &[Token],
    doctype: &mut DocType,
) -> Result<(), ParseError> {
    let mut cursor = TokenCursor::new(tokens);

    while let Some(token) = cursor.next() {
        match token.kind {
            TokenKind::TagOpen => {
                return Err(ParseError::structural(
                    "element markup is not allowed in a DTD",
                    cursor.position() - 1,
                ));
            }
            TokenKind::PiStart => cursor.skip_past(TokenKind::PiEnd, "processing instruction")?,
            TokenKind::CommentStart => cursor.skip_past(TokenKind::CommentEnd, "comment")?,
            TokenKind::DeclarationStart => {
                let is_element = cursor
                    .peek()
                    .is_some_and(|t| t.is(TokenKind::String) && t.text == "ELEMENT");
                if is_element {
                    cursor.advance(1);
                    let element = element_declaration(&mut cursor)?;
                    log::trace!(
                        target: "glyphxml::dtd",
                        "declared <{}> as {:?}",
                        element.name(),
                        element.category()
                    );
                    doctype.add_element(element);
                }
                cursor.skip_declaration()?;
            }
            _ => {}
        }
    }

    Ok(())
}

/// Name and content model of an ELEMENT declaration
///
/// The content text is the concatenation of the string tokens up to the
/// closing `>`, so whitespace inside the model is irrelevant.
fn element_declaration(cursor: &mut TokenCursor<'_>) -> Result<DocTypeElement, ParseError> {
    let name_at = cursor.position();
    let name = cursor.expect_string("element name")?;
    if name.is_empty() {
        return Err(ParseError::grammar("empty element name in declaration", name_at));
    }

    let content_at = cursor.position();
    let mut content = String::new();
    while let Some(token) = cursor.peek() {
        match token.kind {
            TokenKind::String => content.push_str(&token.text),
            TokenKind::Whitespace => {}
            _ => break,
        }
        cursor.advance(1);
    }
    if content.is_empty() {
        return Err(ParseError::grammar(
            format!("missing content model for element {name:?}"),
            content_at,
        ));
    }

    DocTypeElement::parse(name, &content).map_err(|e| ParseError {
        position: content_at,
        ..e
    })
}
