//! Tokenizer state machine definitions.
//!
//! Every state is resumable at an arbitrary chunk boundary: nothing here refers
//! to chunk offsets, only to counts and names.

use crate::rawtext::RawTextElement;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenizerState {
    Data,
    /// A `<` was consumed; the next byte decides between markup and text.
    TagOpen,
    /// After `<!`, matching a comment or CDATA opener byte by byte.
    MarkupDeclarationOpen {
        target: Option<MarkupTarget>,
        matched: u8,
    },
    TagName,
    BeforeAttributeName,
    AttributeName,
    BeforeAttributeValue,
    AttributeValueQuoted {
        quote: u8,
    },
    AttributeValueUnquoted,
    /// `dashes` counts the `-` bytes directly before the cursor (saturating at 2).
    Comment {
        dashes: u8,
    },
    /// `brackets` counts the `]` bytes directly before the cursor (saturating at 2).
    Cdata {
        brackets: u8,
    },
    /// `matched` counts the bytes of `</name` seen so far.
    RawText {
        element: RawTextElement,
        matched: u8,
    },
    /// A `</name` close ended the previous chunk. A name byte next means the
    /// sequence was rawtext after all.
    RawTextCloseName {
        element: RawTextElement,
    },
    PlainText,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MarkupTarget {
    Comment,
    Cdata,
}

impl MarkupTarget {
    /// Bytes expected after `<!`, matched ASCII case-insensitively.
    pub(crate) fn keyword(self) -> &'static [u8] {
        match self {
            MarkupTarget::Comment => b"--",
            MarkupTarget::Cdata => b"[CDATA[",
        }
    }

    pub(crate) fn from_first_byte(byte: u8) -> Option<MarkupTarget> {
        match byte {
            b'-' => Some(MarkupTarget::Comment),
            b'[' => Some(MarkupTarget::Cdata),
            _ => None,
        }
    }
}

const TRACKED_NAME_CAP: usize = 16;

/// Just enough of the current tag to decide whether its `>` enters rawtext.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) struct TagTracker {
    name: [u8; TRACKED_NAME_CAP],
    len: u8,
    overflow: bool,
    pub(crate) closing: bool,
}

impl TagTracker {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn push(&mut self, byte: u8) {
        let len = self.len as usize;
        if len < TRACKED_NAME_CAP {
            self.name[len] = byte;
            self.len += 1;
        } else {
            self.overflow = true;
        }
    }

    pub(crate) fn push_all(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    /// Rawtext element opened by this tag's `>`, if any.
    pub(crate) fn rawtext_element(&self) -> Option<RawTextElement> {
        if self.closing || self.overflow {
            return None;
        }
        RawTextElement::from_name(&self.name[..self.len as usize])
    }
}

/// Resumable tokenizer state carried between chunks.
///
/// Opaque to callers: thread it through [`scan`](super::scan) or let a
/// [`Tokenizer`](super::Tokenizer) own it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MachineState {
    pub(crate) state: TokenizerState,
    pub(crate) tag: TagTracker,
}

impl Default for MachineState {
    fn default() -> Self {
        Self {
            state: TokenizerState::Data,
            tag: TagTracker::default(),
        }
    }
}

impl MachineState {
    /// Whether the machine sits in data with nothing pending.
    pub fn is_idle(&self) -> bool {
        self.state == TokenizerState::Data
    }
}
