//! Cumulative document accumulator.

use super::{ExtractError, Span};

/// Concatenation of every chunk fed to a parser, in call order.
///
/// Grows monotonically; offsets handed out against it stay valid for the
/// lifetime of the owning parser.
#[derive(Clone, Debug, Default)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return the document offset it starts at.
    pub fn push_str(&mut self, chunk: &str) -> usize {
        let base = self.text.len();
        self.text.push_str(chunk);
        base
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.text.as_bytes().get(offset).copied()
    }

    /// Resolve a span produced by the parser itself.
    pub(crate) fn slice(&self, span: Span) -> &str {
        &self.text[span.start..span.end]
    }

    /// Checked `[start, end)` substring.
    pub fn extract(&self, start: usize, end: usize) -> Result<&str, ExtractError> {
        let len = self.text.len();
        if end > len {
            return Err(ExtractError::EndOutOfRange { end, len });
        }
        if end < start {
            return Err(ExtractError::EndBeforeStart { start, end });
        }
        for offset in [start, end] {
            if !self.text.is_char_boundary(offset) {
                return Err(ExtractError::NotCharBoundary { offset });
            }
        }
        Ok(&self.text[start..end])
    }

    /// 1-based `(line, column)` of `offset`; columns count characters.
    pub fn location(&self, offset: usize) -> (usize, usize) {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let head = &self.text.as_bytes()[..offset];
        let line = 1 + memchr::memchr_iter(b'\n', head).count();
        let line_start = memchr::memrchr(b'\n', head).map_or(0, |idx| idx + 1);
        let column = 1 + self.text[line_start..offset].chars().count();
        (line, column)
    }
}
