//! Chunk-local tokenizer.
//!
//! The tokenizer classifies the bytes of one chunk into [`Token`] spans and
//! carries an explicit [`MachineState`] to the next chunk. It never looks past
//! the end of the chunk it was given.
//!
//! Invariants:
//! - Coverage: the tokens of one call are non-empty, contiguous and in order;
//!   together they cover the whole chunk.
//! - Resumability: any split point is valid, including inside delimiters such
//!   as `<!--`, `-->` or `</script`. Parts of a delimiter that land in an earlier
//!   chunk are emitted with that chunk's current kind; the parser folds them
//!   back.
//! - Tolerance: no input is rejected.

use crate::rawtext::RawTextElement;
use crate::shared::{Token, TokenKind};
use states::{MarkupTarget, TagTracker, TokenizerState};

mod emit;
mod input;
mod states;
mod token_fmt;

pub use states::MachineState;
pub use token_fmt::{TokenFmtError, format_token, format_tokens};

/// Minimal tokenizer instrumentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenizerStats {
    pub chunks: u64,
    pub steps: u64,
    pub state_transitions: u64,
    pub tokens_emitted: u64,
}

impl TokenizerStats {
    fn absorb(&mut self, other: TokenizerStats) {
        self.chunks = self.chunks.saturating_add(other.chunks);
        self.steps = self.steps.saturating_add(other.steps);
        self.state_transitions = self
            .state_transitions
            .saturating_add(other.state_transitions);
        self.tokens_emitted = self.tokens_emitted.saturating_add(other.tokens_emitted);
    }
}

/// Tokenizer owning its machine state across chunks.
#[derive(Clone, Debug, Default)]
pub struct Tokenizer {
    machine: MachineState,
    stats: TokenizerStats,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize one chunk, handing every token to `sink` in emission order.
    ///
    /// Token offsets are local to `chunk`.
    pub fn tokenize(&mut self, chunk: &str, mut sink: impl FnMut(Token)) {
        let mut scanner = Scanner::new(chunk.as_bytes(), self.machine, &mut sink);
        scanner.run();
        self.machine = scanner.machine();
        self.stats.absorb(scanner.stats);
    }

    /// Tokenize one chunk into a vector.
    pub fn tokenize_to_vec(&mut self, chunk: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        self.tokenize(chunk, |token| tokens.push(token));
        tokens
    }

    pub fn machine_state(&self) -> MachineState {
        self.machine
    }

    /// Return a copy of current instrumentation counters.
    pub fn stats(&self) -> TokenizerStats {
        self.stats
    }
}

/// Pure form of [`Tokenizer::tokenize`]: scan `chunk` from `entry` and return
/// the state for the next chunk.
pub fn scan(chunk: &str, entry: MachineState, mut sink: impl FnMut(Token)) -> MachineState {
    let mut scanner = Scanner::new(chunk.as_bytes(), entry, &mut sink);
    scanner.run();
    scanner.machine()
}

/// Tokenize a complete document in one call.
pub fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::new().tokenize_to_vec(input)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Progress,
    NeedMoreInput,
}

/// Open token whose end is not known yet.
#[derive(Clone, Copy, Debug)]
struct Run {
    kind: TokenKind,
    start: usize,
}

/// One pass over one chunk.
pub(crate) struct Scanner<'a, F: FnMut(Token)> {
    bytes: &'a [u8],
    pos: usize,
    state: TokenizerState,
    tag: TagTracker,
    run: Option<Run>,
    /// Chunk offset of the `<` of a pending rawtext close match; 0 when the
    /// match began in an earlier chunk.
    raw_match_start: usize,
    sink: F,
    stats: TokenizerStats,
}

impl<'a, F: FnMut(Token)> Scanner<'a, F> {
    fn new(bytes: &'a [u8], entry: MachineState, sink: F) -> Self {
        Self {
            bytes,
            pos: 0,
            state: entry.state,
            tag: entry.tag,
            run: None,
            raw_match_start: 0,
            sink,
            stats: TokenizerStats::default(),
        }
    }

    fn machine(&self) -> MachineState {
        MachineState {
            state: self.state,
            tag: self.tag,
        }
    }

    fn run(&mut self) {
        self.stats.chunks += 1;
        loop {
            self.stats.steps = self.stats.steps.saturating_add(1);
            match self.step() {
                Step::Progress => {}
                Step::NeedMoreInput => break,
            }
        }
        self.finish_chunk();
        debug_assert_eq!(self.pos, self.bytes.len(), "scanner must consume the chunk");
    }

    fn finish_chunk(&mut self) {
        if let TokenizerState::RawText { element, matched } = self.state
            && usize::from(matched) == close_sequence_len(element)
        {
            self.commit_rawtext_close(element);
            self.transition_to(TokenizerState::RawTextCloseName { element });
        }
        self.flush_run();
    }

    fn transition_to(&mut self, next: TokenizerState) {
        if self.state == next {
            return;
        }
        #[cfg(any(test, feature = "debug-stats"))]
        {
            log::trace!(
                target: "html_tokenizer.tokenizer",
                "state {:?} -> {:?} @{}",
                self.state,
                next,
                self.pos
            );
        }
        self.state = next;
        self.stats.state_transitions = self.stats.state_transitions.saturating_add(1);
    }

    fn step(&mut self) -> Step {
        match self.state {
            TokenizerState::Data => self.step_data(),
            TokenizerState::TagOpen => self.step_tag_open(),
            TokenizerState::MarkupDeclarationOpen { target, matched } => {
                self.step_markup_declaration_open(target, matched)
            }
            TokenizerState::TagName => self.step_tag_name(),
            TokenizerState::BeforeAttributeName => self.step_before_attribute_name(),
            TokenizerState::AttributeName => self.step_attribute_name(),
            TokenizerState::BeforeAttributeValue => self.step_before_attribute_value(),
            TokenizerState::AttributeValueQuoted { quote } => self.step_attribute_value_quoted(quote),
            TokenizerState::AttributeValueUnquoted => self.step_attribute_value_unquoted(),
            TokenizerState::Comment { dashes } => {
                self.step_terminated_section(b'-', dashes, TokenKind::CommentEnd)
            }
            TokenizerState::Cdata { brackets } => {
                self.step_terminated_section(b']', brackets, TokenKind::CdataEnd)
            }
            TokenizerState::RawText { element, matched } => self.step_rawtext(element, matched),
            TokenizerState::RawTextCloseName { element } => self.step_rawtext_close_name(element),
            TokenizerState::PlainText => self.step_plaintext(),
        }
    }

    fn step_data(&mut self) -> Step {
        if !self.has_unconsumed_input() {
            return Step::NeedMoreInput;
        }
        self.begin_run(TokenKind::Text);
        let Some(idx) = memchr::memchr(b'<', self.rest()) else {
            self.pos = self.bytes.len();
            return Step::NeedMoreInput;
        };
        let lt = self.pos + idx;
        match self.bytes.get(lt + 1) {
            Some(&next) if input::starts_markup(next) => {
                self.pos = lt;
                self.flush_run();
                self.begin_run(TokenKind::TagStart);
                self.pos = lt + 1;
                self.transition_to(TokenizerState::TagOpen);
            }
            Some(_) => {
                // Literal `<`; the text run continues.
                self.pos = lt + 1;
            }
            None => {
                // `<` ends the chunk: emitted as text now, decided by the next chunk.
                self.pos = lt + 1;
                self.transition_to(TokenizerState::TagOpen);
            }
        }
        Step::Progress
    }

    fn step_tag_open(&mut self) -> Step {
        let Some(byte) = self.peek() else {
            return Step::NeedMoreInput;
        };
        if !input::starts_markup(byte) {
            self.transition_to(TokenizerState::Data);
            return Step::Progress;
        }
        self.begin_run(TokenKind::TagStart);
        self.tag.reset();
        match byte {
            b'/' => {
                self.tag.closing = true;
                self.pos += 1;
                self.transition_to(TokenizerState::TagName);
            }
            b'!' => {
                self.tag.push(byte);
                self.pos += 1;
                self.transition_to(TokenizerState::MarkupDeclarationOpen {
                    target: None,
                    matched: 0,
                });
            }
            _ => self.transition_to(TokenizerState::TagName),
        }
        Step::Progress
    }

    fn step_markup_declaration_open(&mut self, target: Option<MarkupTarget>, matched: u8) -> Step {
        let Some(byte) = self.peek() else {
            return Step::NeedMoreInput;
        };
        self.begin_run(TokenKind::TagName);
        let Some(target) = target.or_else(|| MarkupTarget::from_first_byte(byte)) else {
            // `<!DOCTYPE` and friends are plain tags.
            self.transition_to(TokenizerState::TagName);
            return Step::Progress;
        };
        let keyword = target.keyword();
        if !keyword[usize::from(matched)].eq_ignore_ascii_case(&byte) {
            self.transition_to(TokenizerState::TagName);
            return Step::Progress;
        }
        self.tag.push(byte);
        self.pos += 1;
        let matched = matched + 1;
        if usize::from(matched) < keyword.len() {
            self.state = TokenizerState::MarkupDeclarationOpen {
                target: Some(target),
                matched,
            };
            return Step::Progress;
        }
        let (kind, next) = match target {
            MarkupTarget::Comment => (TokenKind::CommentStart, TokenizerState::Comment { dashes: 0 }),
            MarkupTarget::Cdata => (TokenKind::CdataStart, TokenizerState::Cdata { brackets: 0 }),
        };
        self.flush_run_as(kind);
        self.tag.reset();
        self.transition_to(next);
        Step::Progress
    }

    fn step_tag_name(&mut self) -> Step {
        self.begin_run(TokenKind::TagName);
        let consumed = self.consume_while(|byte| !input::is_name_stop(byte));
        let name_start = self.pos - consumed;
        self.tag.push_all(&self.bytes[name_start..self.pos]);
        if !self.has_unconsumed_input() {
            return Step::NeedMoreInput;
        }
        self.flush_run();
        self.transition_to(TokenizerState::BeforeAttributeName);
        Step::Progress
    }

    fn step_before_attribute_name(&mut self) -> Step {
        let Some(byte) = self.peek() else {
            return Step::NeedMoreInput;
        };
        match byte {
            _ if input::is_whitespace(byte) => self.emit_whitespace_run(),
            b'/' => self.emit_single(TokenKind::Slash),
            b'>' => self.emit_tag_end(),
            b'=' => {
                self.emit_single(TokenKind::Equal);
                self.transition_to(TokenizerState::BeforeAttributeValue);
            }
            b'"' | b'\'' => {
                self.emit_single(TokenKind::AttributeValueStart);
                self.transition_to(TokenizerState::AttributeValueQuoted { quote: byte });
            }
            _ => {
                self.begin_run(TokenKind::AttributeName);
                self.transition_to(TokenizerState::AttributeName);
            }
        }
        Step::Progress
    }

    fn step_attribute_name(&mut self) -> Step {
        self.begin_run(TokenKind::AttributeName);
        self.consume_while(|byte| !input::is_name_stop(byte));
        if !self.has_unconsumed_input() {
            return Step::NeedMoreInput;
        }
        self.flush_run();
        self.transition_to(TokenizerState::BeforeAttributeName);
        Step::Progress
    }

    fn step_before_attribute_value(&mut self) -> Step {
        let Some(byte) = self.peek() else {
            return Step::NeedMoreInput;
        };
        match byte {
            _ if input::is_whitespace(byte) => self.emit_whitespace_run(),
            b'"' | b'\'' => {
                self.emit_single(TokenKind::AttributeValueStart);
                self.transition_to(TokenizerState::AttributeValueQuoted { quote: byte });
            }
            b'>' => self.emit_tag_end(),
            _ => {
                self.begin_run(TokenKind::AttributeUnquotedValue);
                self.transition_to(TokenizerState::AttributeValueUnquoted);
            }
        }
        Step::Progress
    }

    fn step_attribute_value_quoted(&mut self, quote: u8) -> Step {
        if !self.has_unconsumed_input() {
            return Step::NeedMoreInput;
        }
        self.begin_run(TokenKind::Text);
        let Some(idx) = memchr::memchr(quote, self.rest()) else {
            self.pos = self.bytes.len();
            return Step::NeedMoreInput;
        };
        self.pos += idx;
        self.flush_run();
        self.emit_single(TokenKind::AttributeValueEnd);
        self.transition_to(TokenizerState::BeforeAttributeName);
        Step::Progress
    }

    fn step_attribute_value_unquoted(&mut self) -> Step {
        self.begin_run(TokenKind::AttributeUnquotedValue);
        // `=` and `/` are value bytes here; only whitespace and `>` terminate.
        self.consume_while(|byte| !input::is_whitespace(byte) && byte != b'>');
        if !self.has_unconsumed_input() {
            return Step::NeedMoreInput;
        }
        self.flush_run();
        self.transition_to(TokenizerState::BeforeAttributeName);
        Step::Progress
    }

    /// Comment and CDATA bodies: text up to `marker marker >`.
    fn step_terminated_section(&mut self, marker: u8, count: u8, end_kind: TokenKind) -> Step {
        if !self.has_unconsumed_input() {
            return Step::NeedMoreInput;
        }
        self.begin_run(TokenKind::Text);
        let Some(idx) = memchr::memchr2(marker, b'>', self.rest()) else {
            self.pos = self.bytes.len();
            self.set_section_count(0);
            return Step::NeedMoreInput;
        };
        let at = self.pos + idx;
        let count = if idx > 0 { 0 } else { count };
        if self.bytes[at] == marker {
            self.pos = at + 1;
            self.set_section_count((count + 1).min(2));
            return Step::Progress;
        }
        if count < 2 {
            self.pos = at + 1;
            self.set_section_count(0);
            return Step::Progress;
        }
        // Markers from an earlier chunk were already emitted as text.
        let run_start = self.run.map_or(at, |run| run.start);
        let terminator_start = at.saturating_sub(2).max(run_start);
        self.pos = terminator_start;
        self.flush_run();
        self.emit(Token::new(end_kind, terminator_start, at + 1));
        self.pos = at + 1;
        self.transition_to(TokenizerState::Data);
        Step::Progress
    }

    fn set_section_count(&mut self, count: u8) {
        match self.state {
            TokenizerState::Comment { .. } => self.state = TokenizerState::Comment { dashes: count },
            TokenizerState::Cdata { .. } => self.state = TokenizerState::Cdata { brackets: count },
            _ => debug_assert!(false, "section count outside comment/cdata"),
        }
    }

    fn step_rawtext(&mut self, element: RawTextElement, matched: u8) -> Step {
        if !self.has_unconsumed_input() {
            return Step::NeedMoreInput;
        }
        self.begin_run(TokenKind::Text);
        let name = element.name().as_bytes();
        let full = close_sequence_len(element);
        let mut matched = usize::from(matched);
        while let Some(byte) = self.peek() {
            if matched == 0 {
                let Some(idx) = memchr::memchr(b'<', self.rest()) else {
                    self.pos = self.bytes.len();
                    break;
                };
                self.pos += idx;
                self.raw_match_start = self.pos;
                self.pos += 1;
                matched = 1;
            } else if matched == 1 {
                if byte == b'/' {
                    self.pos += 1;
                    matched = 2;
                } else {
                    matched = 0;
                }
            } else if matched < full {
                if byte.eq_ignore_ascii_case(&name[matched - 2]) {
                    self.pos += 1;
                    matched += 1;
                } else {
                    matched = 0;
                }
            } else if input::is_name_stop(byte) {
                self.commit_rawtext_close(element);
                return Step::Progress;
            } else {
                matched = 0;
            }
        }
        self.state = TokenizerState::RawText {
            element,
            matched: matched as u8,
        };
        Step::NeedMoreInput
    }

    fn step_rawtext_close_name(&mut self, element: RawTextElement) -> Step {
        let Some(byte) = self.peek() else {
            return Step::NeedMoreInput;
        };
        if input::is_name_stop(byte) {
            self.transition_to(TokenizerState::TagName);
        } else {
            self.tag.reset();
            self.transition_to(TokenizerState::RawText {
                element,
                matched: 0,
            });
        }
        Step::Progress
    }

    /// Emit the pending `</name` as a closing `tag_start` and resume tag parsing.
    fn commit_rawtext_close(&mut self, element: RawTextElement) {
        let end = self.pos;
        let start = self.raw_match_start.min(end);
        self.pos = start;
        self.flush_run();
        self.pos = end;
        self.emit(Token::new(TokenKind::TagStart, start, end));
        self.tag.reset();
        self.tag.closing = true;
        self.tag.push_all(element.name().as_bytes());
        self.transition_to(TokenizerState::TagName);
    }

    fn step_plaintext(&mut self) -> Step {
        if self.has_unconsumed_input() {
            self.begin_run(TokenKind::Text);
            self.pos = self.bytes.len();
        }
        Step::NeedMoreInput
    }

    fn emit_tag_end(&mut self) {
        self.emit_single(TokenKind::TagEnd);
        let next = match self.tag.rawtext_element() {
            Some(element) if element.has_end_tag() => TokenizerState::RawText {
                element,
                matched: 0,
            },
            Some(_) => TokenizerState::PlainText,
            None => TokenizerState::Data,
        };
        self.tag.reset();
        self.transition_to(next);
    }
}

fn close_sequence_len(element: RawTextElement) -> usize {
    element.name().len() + 2
}
