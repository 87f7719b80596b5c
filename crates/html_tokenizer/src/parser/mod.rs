//! Cross-chunk parser.
//!
//! The parser feeds chunks to its [`Tokenizer`], appends them to a cumulative
//! [`Document`] and folds every token into a [`Context`] plus a handful of
//! value buffers (tag name, attribute name/value, comment, CDATA, rawtext).
//!
//! Buffers are kept as spans over the document, so a value split across any
//! number of chunks resolves to one contiguous string. Parts of a delimiter
//! that the tokenizer emitted as text in an earlier chunk (`-`, `]`, `</scr`)
//! are cut off again when the delimiter completes; this is what makes the
//! final state independent of how the input was split.

use crate::rawtext::RawTextElement;
use crate::shared::{
    Document, ExtractError, ParserError, Span, Token, TokenKind, extend, truncate,
};
use crate::tokenizer::{Tokenizer, TokenizerStats};
use tools::utf8::{
    Utf8StreamError, finish_utf8, finish_utf8_strict, push_utf8_chunk, push_utf8_chunk_strict,
};

mod context;

pub use context::{CoarseContext, Context};

/// How `push_bytes` treats malformed UTF-8.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Utf8Policy {
    /// Replace invalid sequences with U+FFFD.
    #[default]
    Lossy,
    /// Stop at the first invalid sequence with a [`ParserError`].
    Strict,
}

/// Configuration for the parser.
#[derive(Clone, Debug, Default)]
pub struct ParserConfig {
    pub utf8: Utf8Policy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParserStats {
    pub chunks: u64,
    pub bytes: u64,
    pub tokenizer: TokenizerStats,
}

/// Owned copy of every caller-visible query at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParserSnapshot {
    pub context: Context,
    pub tag_name: Option<String>,
    pub attribute_name: Option<String>,
    pub attribute_value: Option<String>,
    pub attribute_quoted: bool,
    pub closing_tag: bool,
    pub self_closing_tag: bool,
    pub comment_text: Option<String>,
    pub cdata_text: Option<String>,
    pub rawtext_text: Option<String>,
}

/// Incremental parser over a sequence of chunks.
///
/// One instance per document; chunks must be fed in document order.
#[derive(Clone, Debug, Default)]
pub struct Parser {
    config: ParserConfig,
    tokenizer: Tokenizer,
    document: Document,
    state: ParseState,
    utf8_carry: Vec<u8>,
    decoded: String,
    chunks: u64,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Advance over one chunk.
    pub fn parse(&mut self, chunk: &str) {
        self.parse_with(chunk, |_| {});
    }

    /// Advance over one chunk, handing each raw token to `visitor` first.
    ///
    /// Token offsets are local to `chunk`.
    pub fn parse_with(&mut self, chunk: &str, mut visitor: impl FnMut(Token)) {
        self.chunks += 1;
        let base = self.document.push_str(chunk);
        let Self {
            tokenizer,
            document,
            state,
            ..
        } = self;
        tokenizer.tokenize(chunk, |token| {
            visitor(token);
            state.reduce(token, base, document);
        });
    }

    /// Advance over raw bytes that may split UTF-8 characters anywhere.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), ParserError> {
        self.push_bytes_with(bytes, |_| {})
    }

    /// Byte form of [`Parser::parse_with`]. Tokens are local to the decoded
    /// text of this call, which may differ from `bytes` at its edges.
    ///
    /// Under [`Utf8Policy::Strict`] the text before an invalid sequence is
    /// still parsed; the rest of `bytes` is dropped.
    pub fn push_bytes_with(
        &mut self,
        bytes: &[u8],
        visitor: impl FnMut(Token),
    ) -> Result<(), ParserError> {
        let mut decoded = std::mem::take(&mut self.decoded);
        decoded.clear();
        let decoded_result = match self.config.utf8 {
            Utf8Policy::Lossy => {
                push_utf8_chunk(&mut decoded, &mut self.utf8_carry, bytes);
                Ok(())
            }
            Utf8Policy::Strict => push_utf8_chunk_strict(&mut decoded, &mut self.utf8_carry, bytes),
        };
        if !decoded.is_empty() {
            self.parse_with(&decoded, visitor);
        }
        self.decoded = decoded;
        decoded_result.map_err(|err| self.fatal(err))
    }

    /// Flush a trailing incomplete UTF-8 sequence left by `push_bytes`.
    pub fn finish(&mut self) -> Result<(), ParserError> {
        self.finish_with(|_| {})
    }

    pub fn finish_with(&mut self, visitor: impl FnMut(Token)) -> Result<(), ParserError> {
        match self.config.utf8 {
            Utf8Policy::Lossy => {
                let mut tail = String::new();
                finish_utf8(&mut tail, &mut self.utf8_carry);
                if !tail.is_empty() {
                    self.parse_with(&tail, visitor);
                }
                Ok(())
            }
            Utf8Policy::Strict => {
                finish_utf8_strict(&mut self.utf8_carry).map_err(|err| self.fatal(err))
            }
        }
    }

    fn fatal(&self, err: Utf8StreamError) -> ParserError {
        let (line, column) = self.document.location(self.document.len());
        log::debug!(
            target: "html_tokenizer.parser",
            "fatal decoding error at line {line}, column {column}: {err}"
        );
        ParserError {
            message: err.to_string(),
            line,
            column,
        }
    }

    pub fn context(&self) -> Context {
        self.state.context
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.resolve(self.state.tag.name)
    }

    pub fn attribute_name(&self) -> Option<&str> {
        self.resolve(self.state.tag.attribute_name)
    }

    pub fn attribute_value(&self) -> Option<&str> {
        self.resolve(self.state.tag.attribute_value)
    }

    pub fn is_attribute_quoted(&self) -> bool {
        self.state.tag.quoted
    }

    pub fn is_closing_tag(&self) -> bool {
        self.state.tag.closing
    }

    pub fn is_self_closing_tag(&self) -> bool {
        self.state.tag.self_closing
    }

    pub fn comment_text(&self) -> Option<&str> {
        self.resolve(self.state.comment)
    }

    pub fn cdata_text(&self) -> Option<&str> {
        self.resolve(self.state.cdata)
    }

    pub fn rawtext_text(&self) -> Option<&str> {
        self.resolve(self.state.rawtext)
    }

    /// Everything parsed so far; empty before the first chunk.
    pub fn document(&self) -> &str {
        self.document.as_str()
    }

    pub fn document_len(&self) -> usize {
        self.document.len()
    }

    /// `document()[start..end]` with checked byte offsets.
    pub fn extract(&self, start: usize, end: usize) -> Result<&str, ExtractError> {
        self.document.extract(start, end)
    }

    pub fn snapshot(&self) -> ParserSnapshot {
        let owned = |value: Option<&str>| value.map(str::to_string);
        ParserSnapshot {
            context: self.context(),
            tag_name: owned(self.tag_name()),
            attribute_name: owned(self.attribute_name()),
            attribute_value: owned(self.attribute_value()),
            attribute_quoted: self.is_attribute_quoted(),
            closing_tag: self.is_closing_tag(),
            self_closing_tag: self.is_self_closing_tag(),
            comment_text: owned(self.comment_text()),
            cdata_text: owned(self.cdata_text()),
            rawtext_text: owned(self.rawtext_text()),
        }
    }

    pub fn stats(&self) -> ParserStats {
        ParserStats {
            chunks: self.chunks,
            bytes: self.document.len() as u64,
            tokenizer: self.tokenizer.stats(),
        }
    }

    fn resolve(&self, span: Option<Span>) -> Option<&str> {
        span.filter(|span| !span.is_empty())
            .map(|span| self.document.slice(span))
    }
}

/// Buffers and flags of the current tag, in document offsets.
#[derive(Clone, Copy, Debug, Default)]
struct TagState {
    name: Option<Span>,
    closing: bool,
    self_closing: bool,
    /// Document offset just past the last `/` of the tag.
    slash_end: Option<usize>,
    attribute_name: Option<Span>,
    attribute_value: Option<Span>,
    quoted: bool,
}

impl TagState {
    fn start_attribute(&mut self) {
        self.attribute_name = None;
        self.attribute_value = None;
        self.quoted = false;
    }
}

/// What a rawtext close sequence replaced. A close that ends a chunk stays
/// open to revision: if the next chunk continues the name, the sequence was
/// rawtext after all.
#[derive(Clone, Copy, Debug)]
struct PendingClose {
    tag: TagState,
    rawtext: Option<Span>,
    close_start: usize,
}

#[derive(Clone, Debug, Default)]
struct ParseState {
    context: Context,
    tag: TagState,
    /// Tag state from before the latest `tag_start`, restored when that start
    /// turns out to be a split `<!--` or `<![CDATA[` opener.
    previous_tag: TagState,
    pending_close: Option<PendingClose>,
    comment: Option<Span>,
    cdata: Option<Span>,
    rawtext: Option<Span>,
}

impl ParseState {
    fn reduce(&mut self, token: Token, base: usize, doc: &Document) {
        let span = token.span().offset(base);
        if let Some(pending) = self.pending_close.take()
            && self.context == Context::TagName
            && matches!(token.kind, TokenKind::Text | TokenKind::TagStart)
        {
            self.reopen_rawtext(pending, span.start);
        }
        match token.kind {
            TokenKind::TagStart if self.context == Context::Rawtext => {
                self.start_rawtext_close(span)
            }
            TokenKind::TagStart => self.start_tag(span, doc),
            TokenKind::TagName => extend(&mut self.tag.name, span),
            TokenKind::Whitespace => {
                let next = match self.context {
                    Context::TagName | Context::UnquotedValue | Context::TagEnd => Context::Tag,
                    Context::AttributeName => Context::AfterAttributeName,
                    other => other,
                };
                self.set_context(next);
            }
            TokenKind::AttributeName => {
                if self.context != Context::AttributeName {
                    self.tag.start_attribute();
                }
                extend(&mut self.tag.attribute_name, span);
                self.set_context(Context::AttributeName);
            }
            TokenKind::Equal => {
                if matches!(self.context, Context::Tag | Context::TagEnd) {
                    self.tag.start_attribute();
                }
                self.set_context(Context::AfterEqual);
            }
            TokenKind::AttributeValueStart => {
                if matches!(self.context, Context::Tag | Context::TagEnd) {
                    self.tag.start_attribute();
                }
                self.tag.attribute_value = None;
                self.tag.quoted = true;
                self.set_context(Context::QuotedValue);
            }
            TokenKind::Text => match self.context {
                Context::QuotedValue => extend(&mut self.tag.attribute_value, span),
                Context::Comment => extend(&mut self.comment, span),
                Context::Cdata => extend(&mut self.cdata, span),
                Context::Rawtext => extend(&mut self.rawtext, span),
                _ => {}
            },
            TokenKind::AttributeValueEnd => self.set_context(Context::Tag),
            TokenKind::AttributeUnquotedValue => {
                if self.context != Context::UnquotedValue {
                    self.tag.attribute_value = None;
                }
                extend(&mut self.tag.attribute_value, span);
                self.tag.quoted = false;
                self.set_context(Context::UnquotedValue);
            }
            TokenKind::Slash => {
                self.tag.slash_end = Some(span.end);
                self.set_context(Context::TagEnd);
            }
            TokenKind::TagEnd => self.end_tag(span, doc),
            TokenKind::CommentStart => {
                self.restore_tag_before_opener();
                self.comment = None;
                self.set_context(Context::Comment);
            }
            TokenKind::CdataStart => {
                self.restore_tag_before_opener();
                self.cdata = None;
                self.set_context(Context::Cdata);
            }
            TokenKind::CommentEnd => {
                truncate(&mut self.comment, span.end.saturating_sub(3));
                self.set_context(Context::None);
            }
            TokenKind::CdataEnd => {
                truncate(&mut self.cdata, span.end.saturating_sub(3));
                self.set_context(Context::None);
            }
        }
    }

    fn set_context(&mut self, next: Context) {
        if self.context == next {
            return;
        }
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(target: "html_tokenizer.parser", "context {} -> {}", self.context, next);
        self.context = next;
    }

    /// A `tag_start` token may lack its `<` when that byte ended the previous
    /// chunk; the `/` of a closing tag is always inside the token.
    fn start_tag(&mut self, span: Span, doc: &Document) {
        self.previous_tag = self.tag;
        self.tag = TagState::default();
        let mut name_start = span.start;
        if doc.byte_at(name_start) == Some(b'<') {
            name_start += 1;
        }
        if name_start < span.end && doc.byte_at(name_start) == Some(b'/') {
            self.tag.closing = true;
            name_start += 1;
        }
        self.tag.name = Some(Span::new(name_start, span.end));
        self.set_context(Context::TagName);
    }

    /// Only an opener split across chunks reaches here in `tag_name`: its
    /// `<!` was first reported as a tag.
    fn restore_tag_before_opener(&mut self) {
        if self.context == Context::TagName {
            self.tag = self.previous_tag;
        }
    }

    /// The tokenizer only emits `tag_start` inside rawtext once `</name` has
    /// fully matched, so the sequence is the last `2 + name.len()` bytes.
    fn start_rawtext_close(&mut self, span: Span) {
        let name_len = self.tag.name.map_or(0, Span::len);
        let close_start = span.end.saturating_sub(name_len + 2);
        self.pending_close = Some(PendingClose {
            tag: self.tag,
            rawtext: self.rawtext,
            close_start,
        });
        truncate(&mut self.rawtext, close_start);
        self.tag = TagState {
            name: Some(Span::new((close_start + 2).min(span.end), span.end)),
            closing: true,
            ..TagState::default()
        };
        self.set_context(Context::TagName);
    }

    /// Undo [`ParseState::start_rawtext_close`]: everything up to `at` is
    /// rawtext again.
    fn reopen_rawtext(&mut self, pending: PendingClose, at: usize) {
        self.tag = pending.tag;
        let start = pending
            .rawtext
            .map_or(pending.close_start, |span| span.start);
        self.rawtext = Some(Span::new(start, at));
        self.set_context(Context::Rawtext);
    }

    fn end_tag(&mut self, span: Span, doc: &Document) {
        self.tag.self_closing = self.tag.slash_end == Some(span.start);
        let element = self
            .tag
            .name
            .filter(|_| !self.tag.closing)
            .and_then(|name| RawTextElement::from_name(doc.slice(name).as_bytes()));
        if element.is_some() {
            self.rawtext = None;
            self.set_context(Context::Rawtext);
        } else {
            self.set_context(Context::None);
        }
    }
}

#[cfg(test)]
mod tests;
