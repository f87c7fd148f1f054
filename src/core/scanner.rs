//! Code Unit Cursor
//!
//! Reads one code unit at a time from a byte buffer whose unit width
//! (1, 2 or 4 bytes) was fixed by BOM detection. A trailing partial unit
//! is treated as end of input.

use super::encoding::Encoding;
use memchr::memmem;

/// Cursor over the code units of an input buffer
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    encoding: Encoding,
}

impl<'a> Scanner<'a> {
    /// Create a scanner, consuming any byte order mark
    pub fn new(input: &'a [u8]) -> Self {
        let (encoding, bom_len) = Encoding::detect(input);
        Scanner {
            input,
            pos: bom_len,
            encoding,
        }
    }

    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Current byte offset
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos + self.encoding.unit_width() > self.input.len()
    }

    /// Read the unit `offset` units ahead of the cursor
    ///
    /// Unless `peek` is set, the cursor moves past the unit read, i.e. by
    /// `(offset + 1) * unit_width` bytes. Returns `None` at end of input.
    pub fn read(&mut self, offset: usize, peek: bool) -> Option<u32> {
        let width = self.encoding.unit_width();
        let start = self.pos + offset * width;
        let bytes = self.input.get(start..start + width)?;
        let unit = self.encoding.decode_unit(bytes);
        if !peek {
            self.pos = start + width;
        }
        Some(unit)
    }

    /// Peek at the current unit without advancing
    #[inline]
    pub fn peek(&self) -> Option<u32> {
        self.peek_at(0)
    }

    /// Peek at the unit `offset` units ahead without advancing
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u32> {
        let width = self.encoding.unit_width();
        let start = self.pos + offset * width;
        let bytes = self.input.get(start..start + width)?;
        Some(self.encoding.decode_unit(bytes))
    }

    /// Consume and return the current unit
    #[inline]
    pub fn next_unit(&mut self) -> Option<u32> {
        self.read(0, false)
    }

    /// Skip `n` units
    #[inline]
    pub fn advance(&mut self, n: usize) {
        let target = self.pos + n * self.encoding.unit_width();
        self.pos = target.min(self.input.len());
    }

    /// Check whether the upcoming units spell out an ASCII sequence
    pub fn starts_with_ascii(&self, needle: &[u8]) -> bool {
        needle
            .iter()
            .enumerate()
            .all(|(i, &b)| self.peek_at(i) == Some(b as u32))
    }

    /// Find an ASCII terminator in byte-wide input
    ///
    /// Returns the byte offset of the terminator's first byte. Only
    /// meaningful when units are single bytes; wide encodings return
    /// `None` and callers fall back to unit-by-unit scanning.
    pub fn find_bytes(&self, needle: &[u8]) -> Option<usize> {
        if !self.encoding.is_byte_wide() {
            return None;
        }
        memmem::find(&self.input[self.pos..], needle).map(|i| self.pos + i)
    }

    /// Raw bytes between two offsets
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.input[start..end]
    }

    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }
}
