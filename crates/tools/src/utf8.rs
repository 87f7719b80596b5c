//! Incremental UTF-8 decoding for byte sources split at arbitrary points.
//!
//! `carry` holds the incomplete suffix of the previous chunk (at most three
//! bytes) so that multi-byte characters survive chunk boundaries.

use std::fmt;

/// Append a byte chunk to `text`, replacing invalid sequences with U+FFFD.
pub fn push_utf8_chunk(text: &mut String, carry: &mut Vec<u8>, bytes: &[u8]) {
    if bytes.is_empty() {
        return;
    }

    let mut remaining = bytes;
    while !carry.is_empty() && !remaining.is_empty() {
        let expected_len = utf8_seq_len(carry[0]);
        if expected_len == 0 {
            text.push('\u{FFFD}');
            carry.clear();
            break;
        }

        let needed = expected_len.saturating_sub(carry.len());
        if needed == 0 {
            let pending = std::mem::take(carry);
            decode_lossy(text, carry, &pending);
            continue;
        }

        if remaining.len() < needed {
            carry.extend_from_slice(remaining);
            return;
        }

        let mut scratch = [0u8; 8];
        let carry_len = carry.len();
        scratch[..carry_len].copy_from_slice(carry);
        scratch[carry_len..carry_len + needed].copy_from_slice(&remaining[..needed]);
        carry.clear();
        decode_lossy(text, carry, &scratch[..carry_len + needed]);
        remaining = &remaining[needed..];
    }

    if !remaining.is_empty() {
        decode_lossy(text, carry, remaining);
    }
}

/// Flush carried bytes lossily so the stream is never silently truncated.
pub fn finish_utf8(text: &mut String, carry: &mut Vec<u8>) {
    if carry.is_empty() {
        return;
    }
    text.push_str(&String::from_utf8_lossy(carry));
    carry.clear();
}

/// Strict decoding failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Utf8StreamError {
    /// A byte sequence that can never be valid UTF-8.
    Invalid { sequence: Vec<u8> },
    /// The stream ended inside a multi-byte character.
    Truncated { sequence: Vec<u8> },
}

impl fmt::Display for Utf8StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Utf8StreamError::Invalid { sequence } => {
                write!(f, "invalid UTF-8 sequence {}", hex(sequence))
            }
            Utf8StreamError::Truncated { sequence } => {
                write!(f, "incomplete UTF-8 sequence {} at end of input", hex(sequence))
            }
        }
    }
}

impl std::error::Error for Utf8StreamError {}

/// Strict form of [`push_utf8_chunk`].
///
/// On error, `text` holds everything that decoded before the bad sequence,
/// `carry` is cleared and the rest of `bytes` is not examined.
pub fn push_utf8_chunk_strict(
    text: &mut String,
    carry: &mut Vec<u8>,
    bytes: &[u8],
) -> Result<(), Utf8StreamError> {
    let mut remaining = bytes;
    if !carry.is_empty() && !remaining.is_empty() {
        let needed = utf8_seq_len(carry[0]).saturating_sub(carry.len());
        let take = needed.min(remaining.len());
        let mut pending = std::mem::take(carry);
        pending.extend_from_slice(&remaining[..take]);
        remaining = &remaining[take..];
        match std::str::from_utf8(&pending) {
            Ok(s) => text.push_str(s),
            Err(e) => match e.error_len() {
                Some(len) => {
                    return Err(Utf8StreamError::Invalid {
                        sequence: pending[..len].to_vec(),
                    });
                }
                None => {
                    *carry = pending;
                    return Ok(());
                }
            },
        }
    }

    match std::str::from_utf8(remaining) {
        Ok(s) => {
            text.push_str(s);
            Ok(())
        }
        Err(e) => {
            let (valid, rest) = remaining.split_at(e.valid_up_to());
            if let Ok(prefix) = std::str::from_utf8(valid) {
                text.push_str(prefix);
            }
            match e.error_len() {
                Some(len) => Err(Utf8StreamError::Invalid {
                    sequence: rest[..len].to_vec(),
                }),
                None => {
                    carry.extend_from_slice(rest);
                    Ok(())
                }
            }
        }
    }
}

/// Strict form of [`finish_utf8`]: carried bytes are an error.
pub fn finish_utf8_strict(carry: &mut Vec<u8>) -> Result<(), Utf8StreamError> {
    if carry.is_empty() {
        return Ok(());
    }
    Err(Utf8StreamError::Truncated {
        sequence: std::mem::take(carry),
    })
}

fn utf8_seq_len(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

fn decode_lossy(text: &mut String, carry: &mut Vec<u8>, mut bytes: &[u8]) {
    while !bytes.is_empty() {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                text.push_str(s);
                break;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                if let Ok(prefix) = std::str::from_utf8(valid) {
                    text.push_str(prefix);
                }
                match e.error_len() {
                    Some(len) => {
                        text.push('\u{FFFD}');
                        bytes = &rest[len..];
                    }
                    None => {
                        carry.extend_from_slice(rest);
                        break;
                    }
                }
            }
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    let parts: Vec<String> = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
    format!("[{}]", parts.join(" "))
}
