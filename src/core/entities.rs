//! Character Entity Resolution
//!
//! A fixed, deliberately small table of named references:
//! `quot amp apos lt gt #163 euro`. Numeric character references are
//! not decoded beyond a literal lookup of their name, so `&#163;` hits
//! the table and `&#65;` is dropped. Unknown names resolve to nothing.

use super::scanner::Scanner;
use std::borrow::Cow;

const AMPERSAND: u32 = '&' as u32;
const SEMICOLON: u32 = ';' as u32;

/// Look up an entity name (without `&` and `;`)
pub fn resolve_entity(name: &str) -> Option<char> {
    let codepoint = match name {
        "quot" => 0x22,
        "amp" => 0x26,
        "apos" => 0x27,
        "lt" => 0x3C,
        "gt" => 0x3E,
        "#163" => 0xA3,
        "euro" => 0x80,
        _ => return None,
    };
    char::from_u32(codepoint)
}

/// Result of reading one character with entity expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A raw code unit, copied as-is
    Unit(u32),
    /// An entity reference that resolved through the table
    Resolved(char),
    /// An entity reference with an unknown name
    Dropped,
}

/// Read one unit, expanding an entity reference if it starts one
///
/// The entity name is the run of ASCII alphanumerics (optionally led by
/// `#`) after the `&`; a trailing `;` is consumed when present.
pub fn parse_char(scanner: &mut Scanner<'_>) -> Option<Decoded> {
    let unit = scanner.next_unit()?;
    if unit != AMPERSAND {
        return Some(Decoded::Unit(unit));
    }

    let mut name = String::new();
    if scanner.peek() == Some('#' as u32) {
        scanner.advance(1);
        name.push('#');
    }
    while let Some(ch) = scanner.peek().and_then(char::from_u32) {
        if !ch.is_ascii_alphanumeric() {
            break;
        }
        name.push(ch);
        scanner.advance(1);
    }
    if scanner.peek() == Some(SEMICOLON) {
        scanner.advance(1);
    }

    Some(match resolve_entity(&name) {
        Some(ch) => Decoded::Resolved(ch),
        None => Decoded::Dropped,
    })
}

/// Escape text for output using the same fixed table
///
/// Output stops at an embedded NUL.
pub fn escape(input: &str) -> Cow<'_, str> {
    let needs_escape = input
        .chars()
        .any(|c| matches!(c, '"' | '&' | '\'' | '<' | '>' | '\u{A3}' | '\u{80}' | '\0'));
    if !needs_escape {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '\0' => break,
            '"' => result.push_str("&quot;"),
            '&' => result.push_str("&amp;"),
            '\'' => result.push_str("&apos;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\u{A3}' => result.push_str("&#163;"),
            '\u{80}' => result.push_str("&euro;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}
