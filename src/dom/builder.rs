//! Document Builder
//!
//! Recursive descent over the token stream, one call frame per open
//! element. The first structural error aborts the build; as it unwinds,
//! each enclosing element adds an "in element" frame to the report.

use super::document::Document;
use super::element::Element;
use super::node::Node;
use crate::core::cursor::TokenCursor;
use crate::core::dtd::{parse_declarations, DocType};
use crate::core::encoding::Encoding;
use crate::core::tokenizer::{Token, TokenKind};
use crate::error::{ErrorKind, ParseError, ParseErrors};
use crate::loader::ResourceLoader;

pub(crate) struct Builder<'t, 'l> {
    cursor: TokenCursor<'t>,
    loader: Option<&'l dyn ResourceLoader>,
    max_depth: usize,
    document: Document,
}

impl<'t, 'l> Builder<'t, 'l> {
    pub(crate) fn new(
        tokens: &'t [Token],
        loader: Option<&'l dyn ResourceLoader>,
        max_depth: usize,
    ) -> Self {
        Builder {
            cursor: TokenCursor::new(tokens),
            loader,
            max_depth,
            document: Document::default(),
        }
    }

    /// Consume every token, producing the document or the error report
    pub(crate) fn build(mut self, source_encoding: Encoding) -> Result<Document, ParseErrors> {
        let mut root = Element::new("");
        self.parse_nodes(&mut root, 0)?;

        self.document.root = root;
        self.document.source_encoding = source_encoding;
        Ok(self.document)
    }

    /// Parse children into `parent` until its closing tag, or until the
    /// tokens run out at document level
    fn parse_nodes(&mut self, parent: &mut Element, depth: usize) -> Result<(), ParseErrors> {
        while let Some(token) = self.cursor.next() {
            let at = self.cursor.position() - 1;
            match token.kind {
                TokenKind::TagOpen if self.cursor.at(TokenKind::ForwardSlash) => {
                    self.cursor.advance(1);
                    self.close_tag(parent, depth, at)?;
                    return Ok(());
                }
                TokenKind::TagOpen => {
                    let element = self.element(depth + 1, at)?;
                    parent.push(Node::Element(element));
                }
                TokenKind::PiStart => self.processing_instruction()?,
                TokenKind::CommentStart => {
                    let comment = self.comment(at)?;
                    parent.push(Node::Comment(comment));
                }
                TokenKind::DeclarationStart => self.declaration()?,
                TokenKind::Text => parent.push(Node::Text(token.text.clone())),
                _ => {}
            }
        }

        if depth > 0 {
            return Err(ParseError::truncated(
                format!("element <{}> is not closed", parent.name()),
                self.cursor.position(),
            )
            .into());
        }
        Ok(())
    }

    /// Start tag through its children; the `<` at `at` was consumed
    fn element(&mut self, depth: usize, at: usize) -> Result<Element, ParseErrors> {
        let name = self.cursor.expect_string("element name")?;
        if depth > self.max_depth {
            return Err(ParseError::new(
                ErrorKind::Limit,
                format!("<{name}> exceeds the maximum nesting depth of {}", self.max_depth),
                at,
            )
            .into());
        }

        let mut element = Element::new(name);
        loop {
            self.cursor.skip_whitespace();
            match self.cursor.peek_kind() {
                Some(TokenKind::SelfClose) => {
                    self.cursor.advance(1);
                    return Ok(element);
                }
                Some(TokenKind::TagClose) => {
                    self.cursor.advance(1);
                    self.parse_nodes(&mut element, depth).map_err(|mut errors| {
                        errors.push(ParseError::structural(format!("in element <{name}>"), at));
                        errors
                    })?;
                    return Ok(element);
                }
                Some(kind) => match self.cursor.name_value() {
                    Some((attr, value)) => element.set_attribute(attr, value),
                    None => {
                        return Err(ParseError::structural(
                            format!("malformed attribute in <{name}>: unexpected {kind:?}"),
                            self.cursor.position(),
                        )
                        .into());
                    }
                },
                None => {
                    return Err(
                        ParseError::truncated(format!("unterminated start tag <{name}>"), at)
                            .into(),
                    );
                }
            }
        }
    }

    /// `</name>` closing `parent`; the `</` was consumed
    fn close_tag(&mut self, parent: &Element, depth: usize, at: usize) -> Result<(), ParseError> {
        let name = self.cursor.expect_string("closing tag name")?;
        if depth == 0 {
            return Err(ParseError::structural(
                format!("closing tag </{name}> has no open element"),
                at,
            ));
        }
        if name != parent.name() {
            return Err(ParseError::structural(
                format!("closing tag </{name}> does not match <{}>", parent.name()),
                at,
            ));
        }

        self.cursor.skip_whitespace();
        if !self.cursor.at(TokenKind::TagClose) {
            return Err(ParseError::structural(
                format!("expected '>' to end </{name}>"),
                self.cursor.position(),
            ));
        }
        self.cursor.advance(1);
        Ok(())
    }

    /// `<?target name="value" ...?>`; only the `xml` target is kept
    fn processing_instruction(&mut self) -> Result<(), ParseError> {
        let start = self.cursor.position();
        let target = self
            .cursor
            .expect_string("processing instruction target")?
            .to_ascii_lowercase();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.peek_kind() {
                Some(TokenKind::PiEnd) => {
                    self.cursor.advance(1);
                    return Ok(());
                }
                Some(_) => match self.cursor.name_value() {
                    Some((name, value)) if target == "xml" => {
                        match name.to_ascii_lowercase().as_str() {
                            "version" => self.document.version = Some(value.to_string()),
                            "encoding" => self.document.declared_encoding = Some(value.to_string()),
                            _ => {}
                        }
                    }
                    Some(_) => {}
                    None => self.cursor.advance(1),
                },
                None => {
                    return Err(ParseError::truncated(
                        format!("unterminated processing instruction <?{target}"),
                        start,
                    ));
                }
            }
        }
    }

    /// Comment body up to `-->`
    fn comment(&mut self, at: usize) -> Result<String, ParseError> {
        let mut body = String::new();
        while let Some(token) = self.cursor.next() {
            match token.kind {
                TokenKind::CommentEnd => return Ok(body),
                TokenKind::String | TokenKind::Text | TokenKind::Whitespace => {
                    body.push_str(&token.text)
                }
                _ => {}
            }
        }
        Err(ParseError::truncated("unterminated comment", at))
    }

    /// `<!DOCTYPE ...>` or any other declaration, which is skipped
    fn declaration(&mut self) -> Result<(), ParseError> {
        let is_doctype = self
            .cursor
            .peek()
            .is_some_and(|t| t.is(TokenKind::String) && t.text == "DOCTYPE");
        if is_doctype {
            self.cursor.advance(1);
            self.doctype()
        } else {
            self.cursor.skip_declaration()
        }
    }

    fn doctype(&mut self) -> Result<(), ParseError> {
        let mut doctype = DocType::new(self.cursor.expect_string("doctype root element name")?);

        self.cursor.skip_whitespace();
        let keyword = self
            .cursor
            .peek()
            .filter(|t| t.is(TokenKind::String))
            .map(|t| t.text.as_str());
        match keyword {
            Some("PUBLIC") => {
                self.cursor.advance(1);
                doctype.set_public_id(self.cursor.expect_string("public identifier")?);
                self.cursor.skip_whitespace();
                if self.cursor.at(TokenKind::String) {
                    doctype.set_system_id(self.cursor.expect_string("system identifier")?);
                }
            }
            Some("SYSTEM") => {
                self.cursor.advance(1);
                doctype.set_system_id(self.cursor.expect_string("system identifier")?);
            }
            Some(other) => {
                return Err(ParseError::structural(
                    format!("expected PUBLIC or SYSTEM in DOCTYPE, found {other:?}"),
                    self.cursor.position(),
                ));
            }
            None => {}
        }

        if let Some(loader) = self.loader {
            self.load_external(loader, &mut doctype);
        }

        self.cursor.skip_whitespace();
        if self.cursor.at(TokenKind::OpenBracket) {
            let offset = self.cursor.position() + 1;
            let subset = self.cursor.bracketed()?;
            parse_declarations(subset, &mut doctype).map_err(|e| ParseError {
                position: e.position + offset,
                ..e
            })?;
        }
        self.cursor.skip_declaration()?;

        log::debug!(
            target: "glyphxml::builder",
            "doctype <{}> declares {} elements",
            doctype.name(),
            doctype.len()
        );
        self.document.doctype = Some(doctype);
        Ok(())
    }

    /// Fetch and parse external DTD content by public, then system id
    ///
    /// Failures become warnings on the document.
    fn load_external(&mut self, loader: &dyn ResourceLoader, doctype: &mut DocType) {
        let public_id = doctype.public_id().map(str::to_string);
        let system_id = doctype.system_id().map(str::to_string);

        let requests = [
            public_id.map(|id| ("public id", loader.load_public(&id), id)),
            system_id.map(|id| ("system id", loader.load(&id), id)),
        ];

        for (what, result, id) in requests.into_iter().flatten() {
            let failure = match result {
                Ok(bytes) if bytes.is_empty() => {
                    Some(format!("{what} {id:?} resolved to no content"))
                }
                Ok(bytes) => doctype.parse_external(&bytes).err().map(|errors| {
                    format!("external DTD for {what} {id:?} is malformed: {}", errors.first())
                }),
                Err(e) => Some(format!("could not load {what} {id:?}: {e}")),
            };
            if let Some(warning) = failure {
                log::warn!(target: "glyphxml::builder", "{warning}");
                self.document.warnings.push(warning);
            }
        }
    }
}
