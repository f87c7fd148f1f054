//! Parse Errors
//!
//! Failures are values, never panics. Sub-parses return a `ParseError`;
//! the top-level entry points collect them into a `ParseErrors` report,
//! innermost failure first, followed by the element frames it unwound
//! through.

use std::fmt;

/// Category of a parse failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unbalanced or mismatched tags, malformed attribute syntax
    Structural,
    /// Malformed content-model string in an ELEMENT declaration
    Grammar,
    /// Input ended inside a token or construct
    Truncated,
    /// A configured parser limit was exceeded
    Limit,
}

/// A single parse failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    /// Byte offset for tokenizer errors, token index for builder errors
    pub position: usize,
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, position: usize) -> Self {
        ParseError {
            kind,
            message: message.into(),
            position,
        }
    }

    pub fn structural(message: impl Into<String>, position: usize) -> Self {
        Self::new(ErrorKind::Structural, message, position)
    }

    pub fn grammar(message: impl Into<String>, position: usize) -> Self {
        Self::new(ErrorKind::Grammar, message, position)
    }

    pub fn truncated(message: impl Into<String>, position: usize) -> Self {
        Self::new(ErrorKind::Truncated, message, position)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

/// Ordered list of errors reported by a failed parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    pub(crate) fn new(first: ParseError) -> Self {
        ParseErrors { errors: vec![first] }
    }

    pub(crate) fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// The innermost (originating) error
    pub fn first(&self) -> &ParseError {
        // Constructed non-empty and only ever appended to
        &self.errors[0]
    }

    pub fn kind(&self) -> ErrorKind {
        self.first().kind
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// All messages joined by newlines, innermost first
    pub fn report(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        ParseErrors::new(error)
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}

impl std::error::Error for ParseErrors {}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_joins_in_order() {
        let mut errors =
            ParseErrors::new(ParseError::structural("closing tag </b> does not match <a>", 7));
        errors.push(ParseError::structural("in element <a>", 1));
        assert_eq!(
            errors.report(),
            "closing tag </b> does not match <a> (at 7)\nin element <a> (at 1)"
        );
        assert_eq!(errors.kind(), ErrorKind::Structural);
        assert_eq!(errors.len(), 2);
    }
}
