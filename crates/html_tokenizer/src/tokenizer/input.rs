//! Cursor helpers and byte classes.

use crate::shared::Token;
use crate::tokenizer::Scanner;

impl<F: FnMut(Token)> Scanner<'_, F> {
    pub(super) fn has_unconsumed_input(&self) -> bool {
        self.pos < self.bytes.len()
    }

    pub(super) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub(super) fn rest(&self) -> &[u8] {
        &self.bytes[self.pos..]
    }

    /// Advance past bytes matching `pred`; returns the number consumed.
    pub(super) fn consume_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        let len = self
            .rest()
            .iter()
            .position(|&byte| !pred(byte))
            .unwrap_or(self.bytes.len() - start);
        self.pos = start + len;
        len
    }
}

pub(super) fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0C)
}

/// Bytes that end a tag or attribute name.
pub(super) fn is_name_stop(byte: u8) -> bool {
    is_whitespace(byte) || matches!(byte, b'/' | b'>' | b'=' | b'"' | b'\'')
}

/// Bytes after `<` that open markup rather than literal text.
pub(super) fn starts_markup(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'/' || byte == b'!'
}
