//! Types shared by the tokenizer and the parser.

mod document;
mod error;
mod span;
mod token;

pub use document::Document;
pub use error::{ExtractError, ParserError};
pub use span::Span;
pub(crate) use span::{extend, truncate};
pub use token::{Token, TokenKind};
