//! Byte Order Mark Detection
//!
//! Selects the code unit width used by the scanner. Detection looks at
//! the first four bytes only, in priority order:
//! UTF-8 (EF BB BF), UTF-32 (either endianness), UTF-16 (either
//! endianness). Without a BOM the input is read one byte per unit.

/// Encoding fixed for the remainder of the buffer after BOM detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// No BOM: single-byte, UTF-8 compatible
    #[default]
    PlainText,
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
}

impl Encoding {
    /// Detect encoding from a byte order mark
    ///
    /// Returns the encoding and the length of the BOM to skip.
    pub fn detect(input: &[u8]) -> (Self, usize) {
        if input.starts_with(&[0xEF, 0xBB, 0xBF]) {
            return (Encoding::Utf8, 3);
        }

        // UTF-32 LE shares its first two bytes with UTF-16 LE, so the
        // four-byte marks must be tried first
        if input.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
            return (Encoding::Utf32Be, 4);
        }
        if input.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
            return (Encoding::Utf32Le, 4);
        }

        match input {
            [0xFE, 0xFF, ..] => (Encoding::Utf16Be, 2),
            [0xFF, 0xFE, ..] => (Encoding::Utf16Le, 2),
            _ => (Encoding::PlainText, 0),
        }
    }

    /// Bytes per code unit
    #[inline]
    pub fn unit_width(self) -> usize {
        match self {
            Encoding::PlainText | Encoding::Utf8 => 1,
            Encoding::Utf16Le | Encoding::Utf16Be => 2,
            Encoding::Utf32Le | Encoding::Utf32Be => 4,
        }
    }

    /// True when units are raw bytes that can be copied verbatim
    #[inline]
    pub fn is_byte_wide(self) -> bool {
        self.unit_width() == 1
    }

    /// Decode one unit from exactly `unit_width()` bytes
    #[inline]
    pub(crate) fn decode_unit(self, bytes: &[u8]) -> u32 {
        match self {
            Encoding::PlainText | Encoding::Utf8 => bytes[0] as u32,
            Encoding::Utf16Le => u16::from_le_bytes([bytes[0], bytes[1]]) as u32,
            Encoding::Utf16Be => u16::from_be_bytes([bytes[0], bytes[1]]) as u32,
            Encoding::Utf32Le => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            Encoding::Utf32Be => u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::PlainText => "plain",
            Encoding::Utf8 => "utf-8",
            Encoding::Utf16Le => "utf-16le",
            Encoding::Utf16Be => "utf-16be",
            Encoding::Utf32Le => "utf-32le",
            Encoding::Utf32Be => "utf-32be",
        }
    }
}
