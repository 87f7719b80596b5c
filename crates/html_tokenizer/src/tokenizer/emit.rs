//! Token emission helpers.

use crate::shared::{Token, TokenKind};
use crate::tokenizer::{Run, Scanner};

impl<F: FnMut(Token)> Scanner<'_, F> {
    pub(super) fn emit(&mut self, token: Token) {
        debug_assert!(!token.is_empty(), "empty tokens are never emitted");
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(target: "html_tokenizer.tokenizer", "emit token: {token:?}");
        (self.sink)(token);
        self.stats.tokens_emitted = self.stats.tokens_emitted.saturating_add(1);
    }

    /// Emit the byte under the cursor as a token of `kind`.
    pub(super) fn emit_single(&mut self, kind: TokenKind) {
        let start = self.pos;
        self.pos += 1;
        self.emit(Token::new(kind, start, self.pos));
    }

    pub(super) fn emit_whitespace_run(&mut self) {
        let start = self.pos;
        self.consume_while(super::input::is_whitespace);
        self.emit(Token::new(TokenKind::Whitespace, start, self.pos));
    }

    /// Open a run at the cursor unless one is already open.
    pub(super) fn begin_run(&mut self, kind: TokenKind) {
        if self.run.is_none() {
            self.run = Some(Run {
                kind,
                start: self.pos,
            });
        }
    }

    /// Close the open run at the cursor.
    pub(super) fn flush_run(&mut self) {
        if let Some(run) = self.run {
            self.flush_run_as(run.kind);
        }
    }

    pub(super) fn flush_run_as(&mut self, kind: TokenKind) {
        if let Some(run) = self.run.take()
            && self.pos > run.start
        {
            self.emit(Token::new(kind, run.start, self.pos));
        }
    }
}
