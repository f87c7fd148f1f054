//! Markup Tokenizer
//!
//! A single forward pass over the scanner's code units producing a flat,
//! immutable sequence of classified tokens. Delimiters become their own
//! tokens; everything else is a string, a text run or a whitespace run.
//!
//! After each token that closes a markup construct (`>`, `/>`, `-->`,
//! `?>`, `]]>`) the raw text up to the next `<` is captured as one TEXT
//! (or WHITESPACE) token with entities expanded. Inside the `[ ... ]`
//! internal subset of a `<!` declaration that capture is suspended so
//! nested declarations tokenize as markup.

use super::entities::{parse_char, Decoded};
use super::scanner::Scanner;
use crate::error::ParseError;

/// Type of token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Run of space, tab, CR, LF or form feed
    Whitespace,
    /// Character data between markup, or a comment/CDATA body
    Text,
    /// Quoted or unquoted string inside markup
    String,
    /// `=`
    Equals,
    /// `<`
    TagOpen,
    /// `>`
    TagClose,
    /// `/>`
    SelfClose,
    /// `/`
    ForwardSlash,
    /// `<!--`
    CommentStart,
    /// `-->`
    CommentEnd,
    /// `<?`
    PiStart,
    /// `?>`
    PiEnd,
    /// `<!`
    DeclarationStart,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
}

impl TokenKind {
    /// Tokens after which raw text is captured
    #[inline]
    pub fn closes_markup(self) -> bool {
        matches!(
            self,
            TokenKind::TagClose | TokenKind::SelfClose | TokenKind::CommentEnd | TokenKind::PiEnd
        )
    }
}

/// A classified lexical unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the token in the input
    pub offset: usize,
}

impl Token {
    fn new(kind: TokenKind, text: String, offset: usize) -> Self {
        Token { kind, text, offset }
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

const LT: u32 = '<' as u32;
const GT: u32 = '>' as u32;
const QUOTE: u32 = '"' as u32;
const QUESTION: u32 = '?' as u32;
const REPLACEMENT: char = '\u{FFFD}';

#[inline]
fn is_whitespace(unit: u32) -> bool {
    matches!(unit, 0x20 | 0x09 | 0x0A | 0x0C | 0x0D)
}

/// Tokenize a whole buffer
pub fn tokenize(input: &[u8]) -> Result<Vec<Token>, ParseError> {
    Tokenizer::new(input).run()
}

/// Accumulates token text from code units
///
/// Byte-wide units are copied verbatim so UTF-8 passes through; wide
/// units are treated as UTF-16/UTF-32 code units and re-encoded,
/// joining surrogate pairs.
struct TextBuf {
    bytes: Vec<u8>,
    high_surrogate: Option<u32>,
    byte_wide: bool,
}

impl TextBuf {
    fn new(byte_wide: bool) -> Self {
        TextBuf {
            bytes: Vec::new(),
            high_surrogate: None,
            byte_wide,
        }
    }

    fn is_empty(&self) -> bool {
        self.bytes.is_empty() && self.high_surrogate.is_none()
    }

    fn push_unit(&mut self, unit: u32) {
        if self.byte_wide {
            self.bytes.push(unit as u8);
            return;
        }
        match unit {
            0xD800..=0xDBFF => {
                self.flush_surrogate();
                self.high_surrogate = Some(unit);
            }
            0xDC00..=0xDFFF => match self.high_surrogate.take() {
                Some(high) => {
                    let scalar = 0x10000 + ((high - 0xD800) << 10) + (unit - 0xDC00);
                    self.push_scalar(scalar);
                }
                None => self.push_char(REPLACEMENT),
            },
            _ => self.push_scalar(unit),
        }
    }

    fn push_scalar(&mut self, scalar: u32) {
        self.push_char(char::from_u32(scalar).unwrap_or(REPLACEMENT));
    }

    fn push_char(&mut self, ch: char) {
        self.flush_surrogate();
        let mut utf8 = [0u8; 4];
        self.bytes.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    fn flush_surrogate(&mut self) {
        if self.high_surrogate.take().is_some() {
            let mut utf8 = [0u8; 4];
            self.bytes
                .extend_from_slice(REPLACEMENT.encode_utf8(&mut utf8).as_bytes());
        }
    }

    fn finish(mut self) -> String {
        self.flush_surrogate();
        match String::from_utf8(self.bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

/// Tokenizer state: the cursor, the output, the open `<!` declarations,
/// the subset nesting level and whether a processing instruction is open
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    tokens: Vec<Token>,
    declaration_depth: usize,
    subset_depth: usize,
    in_instruction: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let scanner = Scanner::new(input);
        if scanner.position() > 0 {
            log::debug!(
                target: "glyphxml::tokenizer",
                "byte order mark selects {}",
                scanner.encoding().name()
            );
        }
        Tokenizer {
            scanner,
            tokens: Vec::new(),
            declaration_depth: 0,
            subset_depth: 0,
            in_instruction: false,
        }
    }

    /// Consume the whole input
    pub fn run(mut self) -> Result<Vec<Token>, ParseError> {
        while let Some(ch) = self.scanner.peek() {
            if ch == 0 {
                log::debug!(
                    target: "glyphxml::tokenizer",
                    "NUL unit at byte {} ends input",
                    self.scanner.position()
                );
                break;
            }

            let start = self.scanner.position();
            let kind = match char::from_u32(ch) {
                _ if is_whitespace(ch) => {
                    self.whitespace_run(start);
                    continue;
                }
                Some('<') => self.markup_open(start)?,
                Some('>') => {
                    self.declaration_depth = self.declaration_depth.saturating_sub(1);
                    if self.declaration_depth == 0 {
                        self.subset_depth = 0;
                    }
                    self.single(TokenKind::TagClose, start)
                }
                Some('[') => {
                    if self.counts_brackets() {
                        self.subset_depth += 1;
                    }
                    self.single(TokenKind::OpenBracket, start)
                }
                Some(']') => {
                    if self.counts_brackets() {
                        self.subset_depth = self.subset_depth.saturating_sub(1);
                    }
                    self.single(TokenKind::CloseBracket, start)
                }
                Some('=') => self.single(TokenKind::Equals, start),
                Some('/') => {
                    self.scanner.advance(1);
                    if self.scanner.peek() == Some(GT) {
                        self.scanner.advance(1);
                        self.emit(TokenKind::SelfClose, String::new(), start)
                    } else {
                        self.emit(TokenKind::ForwardSlash, String::new(), start)
                    }
                }
                Some('-') if self.scanner.starts_with_ascii(b"-->") => {
                    self.scanner.advance(3);
                    self.emit(TokenKind::CommentEnd, String::new(), start)
                }
                Some('?') if self.scanner.starts_with_ascii(b"?>") => {
                    self.scanner.advance(2);
                    self.in_instruction = false;
                    self.emit(TokenKind::PiEnd, String::new(), start)
                }
                _ => {
                    let text = self.string(start)?;
                    self.emit(TokenKind::String, text, start)
                }
            };

            if kind.closes_markup() && self.subset_depth == 0 {
                self.text_run();
            }
        }

        log::trace!(
            target: "glyphxml::tokenizer",
            "{} tokens from {} bytes",
            self.tokens.len(),
            self.scanner.position()
        );
        Ok(self.tokens)
    }

    /// Brackets nest only inside a declaration, outside instruction data
    #[inline]
    fn counts_brackets(&self) -> bool {
        self.declaration_depth > 0 && !self.in_instruction
    }

    fn emit(&mut self, kind: TokenKind, text: String, offset: usize) -> TokenKind {
        self.tokens.push(Token::new(kind, text, offset));
        kind
    }

    fn single(&mut self, kind: TokenKind, start: usize) -> TokenKind {
        self.scanner.advance(1);
        self.emit(kind, String::new(), start)
    }

    #[inline]
    fn text_buf(&self) -> TextBuf {
        TextBuf::new(self.scanner.encoding().is_byte_wide())
    }

    fn whitespace_run(&mut self, start: usize) {
        let mut buf = self.text_buf();
        while let Some(ch) = self.scanner.peek() {
            if !is_whitespace(ch) {
                break;
            }
            buf.push_unit(ch);
            self.scanner.advance(1);
        }
        self.emit(TokenKind::Whitespace, buf.finish(), start);
    }

    /// Disambiguate `<!--`, `<![CDATA[`, `<?`, `<!` and `<`
    ///
    /// Returns the kind of the last token emitted.
    fn markup_open(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        self.scanner.advance(1);

        if self.scanner.starts_with_ascii(b"!--") {
            self.scanner.advance(3);
            self.emit(TokenKind::CommentStart, String::new(), start);
            return self.comment_body(start);
        }
        if self.scanner.starts_with_ascii(b"![CDATA[") {
            self.scanner.advance(8);
            return self.cdata_body(start);
        }

        Ok(match self.scanner.peek().and_then(char::from_u32) {
            Some('?') => {
                self.scanner.advance(1);
                self.in_instruction = true;
                self.emit(TokenKind::PiStart, String::new(), start)
            }
            Some('!') => {
                self.scanner.advance(1);
                self.declaration_depth += 1;
                self.emit(TokenKind::DeclarationStart, String::new(), start)
            }
            _ => self.emit(TokenKind::TagOpen, String::new(), start),
        })
    }

    /// Scan verbatim up to `terminator`, leaving the cursor past it
    fn verbatim_until(&mut self, terminator: &[u8]) -> Option<String> {
        let mut buf = self.text_buf();

        if self.scanner.encoding().is_byte_wide() {
            let begin = self.scanner.position();
            let end = self.scanner.find_bytes(terminator)?;
            buf.push_bytes(self.scanner.slice(begin, end));
            self.scanner.set_position(end + terminator.len());
            return Some(buf.finish());
        }

        loop {
            if self.scanner.starts_with_ascii(terminator) {
                self.scanner.advance(terminator.len());
                return Some(buf.finish());
            }
            let unit = self.scanner.next_unit()?;
            buf.push_unit(unit);
        }
    }

    fn comment_body(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        let body_start = self.scanner.position();
        let body = self
            .verbatim_until(b"-->")
            .ok_or_else(|| ParseError::truncated("unterminated comment", start))?;
        if !body.is_empty() {
            self.emit(TokenKind::Text, body, body_start);
        }
        let end = self.scanner.position().saturating_sub(3 * self.scanner.encoding().unit_width());
        Ok(self.emit(TokenKind::CommentEnd, String::new(), end))
    }

    /// A CDATA section becomes a single verbatim TEXT token
    fn cdata_body(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        let body = self
            .verbatim_until(b"]]>")
            .ok_or_else(|| ParseError::truncated("unterminated CDATA section", start))?;
        if !body.is_empty() {
            self.emit(TokenKind::Text, body, start);
        }
        self.text_run();
        // The section closes its own markup; text after it was captured above
        Ok(TokenKind::Text)
    }

    /// Capture character data up to the next `<`
    fn text_run(&mut self) {
        let start = self.scanner.position();
        let mut buf = self.text_buf();
        let mut whitespace = true;

        while let Some(ch) = self.scanner.peek() {
            if ch == LT {
                break;
            }
            match parse_char(&mut self.scanner) {
                Some(Decoded::Unit(0)) | Some(Decoded::Dropped) => {}
                Some(Decoded::Unit(unit)) => {
                    whitespace &= is_whitespace(unit);
                    buf.push_unit(unit);
                }
                Some(Decoded::Resolved(c)) => {
                    whitespace = false;
                    buf.push_char(c);
                }
                None => break,
            }
        }

        if !buf.is_empty() {
            let kind = if whitespace { TokenKind::Whitespace } else { TokenKind::Text };
            let text = buf.finish();
            self.emit(kind, text, start);
        }
    }

    /// Quoted (double quote only) or unquoted string
    fn string(&mut self, start: usize) -> Result<String, ParseError> {
        let mut buf = self.text_buf();

        if self.scanner.peek() == Some(QUOTE) {
            self.scanner.advance(1);
            loop {
                let ch = self
                    .scanner
                    .peek()
                    .ok_or_else(|| ParseError::truncated("unterminated quoted string", start))?;
                match ch {
                    0x08 | 0x0A | 0x0B | 0x0D => self.scanner.advance(1),
                    0x09 => {
                        self.scanner.advance(1);
                        buf.push_unit(ch);
                    }
                    QUOTE => {
                        self.scanner.advance(1);
                        break;
                    }
                    _ if ch >= 0x20 => self.push_decoded(&mut buf),
                    _ => self.scanner.advance(1),
                }
            }
        } else {
            while let Some(ch) = self.scanner.peek() {
                match ch {
                    0x08 => self.scanner.advance(1),
                    0x3D | GT | 0x2F | 0x09 | 0x0A | 0x0B | 0x0C | 0x0D | 0x20 => break,
                    // Inside `<? ... ?>` a trailing `?>` is not part of the string
                    QUESTION if self.in_instruction && self.scanner.peek_at(1) == Some(GT) => break,
                    _ if ch >= 0x20 => self.push_decoded(&mut buf),
                    _ => self.scanner.advance(1),
                }
            }
            // A lone vertical tab is neither whitespace nor string content
            if self.scanner.position() == start {
                self.scanner.advance(1);
            }
        }

        Ok(buf.finish())
    }

    fn push_decoded(&mut self, buf: &mut TextBuf) {
        match parse_char(&mut self.scanner) {
            Some(Decoded::Unit(unit)) => buf.push_unit(unit),
            Some(Decoded::Resolved(c)) => buf.push_char(c),
            Some(Decoded::Dropped) | None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(input: &[u8]) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn texts(input: &[u8], kind: TokenKind) -> Vec<std::string::String> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_simple_element() {
        assert_eq!(
            kinds(b"<root>content</root>"),
            vec![TagOpen, String, TagClose, Text, TagOpen, ForwardSlash, String, TagClose]
        );
        assert_eq!(texts(b"<root>content</root>", Text), vec!["content"]);
    }

    #[test]
    fn test_attributes_and_self_close() {
        let tokens = tokenize(br#"<glyph unicode="A" d="M0 0L10 10"/>"#).unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TagOpen, String, Whitespace, String, Equals, String, Whitespace, String, Equals,
                String, SelfClose
            ]
        );
        assert_eq!(tokens[5].text, "A");
        assert_eq!(tokens[9].text, "M0 0L10 10");
    }

    #[test]
    fn test_comment() {
        assert_eq!(
            kinds(b"<!-- a <b> & c -->"),
            vec![CommentStart, Text, CommentEnd]
        );
        assert_eq!(texts(b"<!-- a <b> &amp; c -->", Text), vec![" a <b> &amp; c "]);
        assert_eq!(kinds(b"<!---->"), vec![CommentStart, CommentEnd]);
    }

    #[test]
    fn test_unterminated_comment_is_error() {
        let err = tokenize(b"<a><!-- never closed").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Truncated);
        assert_eq!(err.position, 3);
    }

    #[test]
    fn test_processing_instruction() {
        assert_eq!(
            kinds(br#"<?xml version="1.0"?>"#),
            vec![PiStart, String, Whitespace, String, Equals, String, PiEnd]
        );
        assert_eq!(kinds(b"<?pi data?>"), vec![PiStart, String, Whitespace, String, PiEnd]);
        assert_eq!(texts(b"<?pi a?b?>", String), vec!["pi", "a?b"]);
        assert_eq!(texts(b"<!ELEMENT a (b|c)?>", String), vec!["ELEMENT", "a", "(b|c)?"]);
    }

    #[test]
    fn test_declaration_and_brackets() {
        assert_eq!(
            kinds(b"<!DOCTYPE a [<!ELEMENT a (b)>]>"),
            vec![
                DeclarationStart, String, Whitespace, String, Whitespace, OpenBracket,
                DeclarationStart, String, Whitespace, String, Whitespace, String, TagClose,
                CloseBracket, TagClose
            ]
        );
    }

    #[test]
    fn test_subset_suspends_text_capture() {
        let tokens = tokenize(b"<!DOCTYPE a [\n<!ELEMENT a (b)>\n]>\n<a/>").unwrap();
        assert!(tokens.iter().all(|t| t.kind != Text));
        assert!(tokens.iter().any(|t| t.kind == CloseBracket));
    }

    #[test]
    fn test_stray_bracket_keeps_text_capture() {
        assert_eq!(texts(b"<?pi [?><a>hello</a>", Text), vec!["hello"]);
        assert_eq!(texts(b"<!FOO [><a>x</a>", Text), vec!["x"]);
        assert_eq!(texts(b"<a>[</a><b>y</b>", Text), vec!["[", "y"]);
        assert_eq!(
            texts(b"<!DOCTYPE a [<?pi [?><!ELEMENT a (b)>]><a>z</a>", Text),
            vec!["z"]
        );
    }

    #[test]
    fn test_text_entities_decoded() {
        assert_eq!(texts(b"<a>x &lt; y &amp;&bogus; z</a>", Text), vec!["x < y & z"]);
    }

    #[test]
    fn test_whitespace_only_text() {
        let tokens = tokenize(b"<a>\n\t<b/></a>").unwrap();
        assert_eq!(tokens[3].kind, Whitespace);
        assert_eq!(tokens[3].text, "\n\t");
    }

    #[test]
    fn test_quoted_string_control_chars() {
        let tokens = tokenize(b"<a d=\"M0\n0\tL1\r1\"/>").unwrap();
        assert_eq!(tokens[5].text, "M00\tL11");
    }

    #[test]
    fn test_unterminated_quote_is_error() {
        let err = tokenize(b"<a b=\"oops").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Truncated);
    }

    #[test]
    fn test_unquoted_string_stops_at_delimiters() {
        assert_eq!(texts(b"<a b=c/>", String), vec!["a", "b", "c"]);
        assert_eq!(texts(b"<a b=x&amp;y>", String), vec!["a", "b", "x&y"]);
    }

    #[test]
    fn test_cdata_is_verbatim_text() {
        assert_eq!(
            texts(b"<a><![CDATA[<x> &amp; ]]>tail</a>", Text),
            vec!["<x> &amp; ", "tail"]
        );
    }

    #[test]
    fn test_utf16_input() {
        let source = "<a>é</a>";
        let mut input = vec![0xFF, 0xFE];
        for unit in source.encode_utf16() {
            input.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(texts(&input, Text), vec!["é"]);
    }

    #[test]
    fn test_utf16_surrogate_pair() {
        let source = "<a>😀</a>";
        let mut input = vec![0xFE, 0xFF];
        for unit in source.encode_utf16() {
            input.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(texts(&input, Text), vec!["😀"]);
    }

    #[test]
    fn test_utf8_passes_through() {
        assert_eq!(texts("<a>naïve £</a>".as_bytes(), Text), vec!["naïve £"]);
    }

    #[test]
    fn test_vertical_tab_makes_progress() {
        assert_eq!(kinds(b"<a \x0b/>"), vec![TagOpen, String, Whitespace, String, SelfClose]);
    }

    #[test]
    fn test_nul_ends_input() {
        assert_eq!(kinds(b"<a \0 b/>"), vec![TagOpen, String, Whitespace]);
    }
}
