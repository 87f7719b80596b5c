//! Incremental, chunk-resumable HTML tokenizer and context parser.
//!
//! [`Tokenizer`] turns chunks of markup into chunk-local [`Token`]s and
//! carries an opaque [`MachineState`] between calls. [`Parser`] accumulates
//! the chunks into a [`Document`] and answers "where am I" queries: the
//! current [`Context`], tag and attribute names, attribute values and the
//! text of comments, CDATA sections and rawtext elements.
//!
//! Malformed markup never fails; it degrades to text or to the nearest
//! plausible state.

#[cfg(any(test, feature = "test-harness"))]
pub mod chunker;
pub mod parser;
pub mod rawtext;
pub mod shared;
#[cfg(test)]
mod streaming_parity;
#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;
pub mod tokenizer;

pub use crate::parser::{
    CoarseContext, Context, Parser, ParserConfig, ParserSnapshot, ParserStats, Utf8Policy,
};
pub use crate::rawtext::RawTextElement;
pub use crate::shared::{Document, ExtractError, ParserError, Span, Token, TokenKind};
pub use crate::tokenizer::{
    MachineState, TokenFmtError, Tokenizer, TokenizerStats, format_token, format_tokens, scan,
    tokenize,
};
pub use tools::utf8::Utf8StreamError;
