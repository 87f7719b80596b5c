//! Deterministic token formatting for golden tests and the CLI.
//!
//! One line per token: `kind "escaped text"`.

use crate::shared::Token;
use std::fmt::Write;

#[derive(Debug)]
pub enum TokenFmtError {
    InvalidSpan { start: usize, end: usize, len: usize },
}

impl std::fmt::Display for TokenFmtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenFmtError::InvalidSpan { start, end, len } => {
                write!(f, "invalid span: {start}..{end} in chunk of length {len}")
            }
        }
    }
}

impl std::error::Error for TokenFmtError {}

/// Format one token resolved against the chunk that produced it.
pub fn format_token(token: &Token, chunk: &str) -> Result<String, TokenFmtError> {
    let text = chunk
        .get(token.start..token.end)
        .ok_or(TokenFmtError::InvalidSpan {
            start: token.start,
            end: token.end,
            len: chunk.len(),
        })?;
    Ok(format!("{} \"{}\"", token.kind, escape_text(text)))
}

pub fn format_tokens(tokens: &[Token], chunk: &str) -> Result<Vec<String>, TokenFmtError> {
    tokens
        .iter()
        .map(|token| format_token(token, chunk))
        .collect()
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' || ch == '\u{7f}' => {
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}
