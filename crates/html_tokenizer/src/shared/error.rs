//! Error types surfaced by the parser.
//!
//! Malformed markup is never an error. Only range errors on extraction and
//! fatal decoding failures reach the caller.

use std::fmt;

/// Caller-correctable range error from `Parser::extract`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractError {
    /// `end` lies past the end of the document.
    EndOutOfRange { end: usize, len: usize },
    /// `end` lies before `start`.
    EndBeforeStart { start: usize, end: usize },
    /// The range is in bounds but splits a UTF-8 character.
    NotCharBoundary { offset: usize },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::EndOutOfRange { .. } => {
                f.write_str("'end' argument not in range of document")
            }
            ExtractError::EndBeforeStart { .. } => {
                f.write_str("'end' must be greater or equal than 'start'")
            }
            ExtractError::NotCharBoundary { offset } => {
                write!(f, "offset {offset} is not on a character boundary")
            }
        }
    }
}

impl std::error::Error for ExtractError {}

/// Fatal error carrying a 1-based location in the cumulative document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParserError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}, column {})",
            self.message, self.line, self.column
        )
    }
}

impl std::error::Error for ParserError {}
