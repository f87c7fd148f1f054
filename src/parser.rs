//! Parser Configuration
//!
//! `Parser` bundles the settings of a parse: an optional resource loader
//! for external DTDs and a nesting limit. It holds no per-parse state, so
//! one value can drive any number of parses, concurrently included.

use crate::core::dtd::DocType;
use crate::core::encoding::Encoding;
use crate::core::tokenizer::tokenize;
use crate::dom::builder::Builder;
use crate::dom::Document;
use crate::error::ParseErrors;
use crate::loader::ResourceLoader;

/// Default limit on element nesting
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Parse settings
#[derive(Clone, Copy)]
pub struct Parser<'l> {
    loader: Option<&'l dyn ResourceLoader>,
    max_depth: usize,
}

impl Default for Parser<'_> {
    fn default() -> Self {
        Parser {
            loader: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl std::fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("loader", &self.loader.is_some())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl<'l> Parser<'l> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve DOCTYPE public and system identifiers through `loader`
    pub fn with_loader(mut self, loader: &'l dyn ResourceLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Deepest element nesting accepted before failing
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[inline]
    pub fn loader(&self) -> Option<&'l dyn ResourceLoader> {
        self.loader
    }

    #[inline]
    pub fn depth_limit(&self) -> usize {
        self.max_depth
    }

    /// Parse a complete document
    ///
    /// On failure no tree is returned; the errors list the originating
    /// problem first, then the elements it was nested in.
    pub fn parse(&self, input: &[u8]) -> Result<Document, ParseErrors> {
        let (encoding, _) = Encoding::detect(input);
        let tokens = tokenize(input)?;
        let document = Builder::new(&tokens, self.loader, self.max_depth).build(encoding)?;

        log::debug!(
            target: "glyphxml::parser",
            "parsed {} bytes: {} top-level nodes, {} warnings",
            input.len(),
            document.root().children().len(),
            document.warnings().len()
        );
        Ok(document)
    }

    /// Parse a standalone DTD
    pub fn parse_dtd(&self, input: &[u8]) -> Result<DocType, ParseErrors> {
        DocType::parse(input)
    }
}
