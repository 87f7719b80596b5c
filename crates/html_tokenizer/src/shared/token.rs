//! Token model.

use super::Span;
use std::fmt;

/// Classification of a token span.
///
/// The first ten kinds are the tag/attribute vocabulary; `TagName` and the
/// comment/CDATA delimiters complete it for chunked input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Text,
    Whitespace,
    TagStart,
    TagEnd,
    AttributeName,
    Equal,
    AttributeValueStart,
    AttributeValueEnd,
    AttributeUnquotedValue,
    Slash,
    /// Name bytes continuing a `tag_start` from an earlier chunk, including
    /// the rest of a `<!` declaration split after `<!`.
    TagName,
    CommentStart,
    CommentEnd,
    CdataStart,
    CdataEnd,
}

impl TokenKind {
    pub const ALL: [TokenKind; 15] = [
        TokenKind::Text,
        TokenKind::Whitespace,
        TokenKind::TagStart,
        TokenKind::TagEnd,
        TokenKind::AttributeName,
        TokenKind::Equal,
        TokenKind::AttributeValueStart,
        TokenKind::AttributeValueEnd,
        TokenKind::AttributeUnquotedValue,
        TokenKind::Slash,
        TokenKind::TagName,
        TokenKind::CommentStart,
        TokenKind::CommentEnd,
        TokenKind::CdataStart,
        TokenKind::CdataEnd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Text => "text",
            TokenKind::Whitespace => "whitespace",
            TokenKind::TagStart => "tag_start",
            TokenKind::TagEnd => "tag_end",
            TokenKind::AttributeName => "attribute_name",
            TokenKind::Equal => "equal",
            TokenKind::AttributeValueStart => "attribute_value_start",
            TokenKind::AttributeValueEnd => "attribute_value_end",
            TokenKind::AttributeUnquotedValue => "attribute_unquoted_value",
            TokenKind::Slash => "slash",
            TokenKind::TagName => "tag_name",
            TokenKind::CommentStart => "comment_start",
            TokenKind::CommentEnd => "comment_end",
            TokenKind::CdataStart => "cdata_start",
            TokenKind::CdataEnd => "cdata_end",
        }
    }

    /// Inverse of [`TokenKind::as_str`].
    pub fn from_name(name: &str) -> Option<TokenKind> {
        TokenKind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified byte range of one chunk.
///
/// Invariant: `start <= end <= chunk.len()`, and both offsets fall on UTF-8
/// character boundaries of the chunk that produced the token. Offsets are
/// meaningless outside that chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "token start must be <= end");
        Self { kind, start, end }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Resolve the token against the chunk it was produced from.
    pub fn text<'a>(&self, chunk: &'a str) -> &'a str {
        &chunk[self.start..self.end]
    }
}
