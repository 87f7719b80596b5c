//! Byte spans.

/// Half-open byte range `[start, end)`.
///
/// Token spans are chunk-local; parser buffers hold spans into the cumulative
/// document instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must be <= end");
        Self { start, end }
    }

    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn offset(self, base: usize) -> Self {
        Self::new(self.start + base, self.end + base)
    }
}

/// Grow `buffer` to cover `span`, opening it when absent.
///
/// Buffers only ever grow over contiguous document ranges.
pub(crate) fn extend(buffer: &mut Option<Span>, span: Span) {
    match buffer {
        Some(current) => {
            debug_assert!(current.end <= span.start, "buffer spans must be contiguous");
            current.end = span.end;
        }
        None => *buffer = Some(span),
    }
}

/// Cut `buffer` at `at`, dropping it entirely when nothing remains.
pub(crate) fn truncate(buffer: &mut Option<Span>, at: usize) {
    if let Some(current) = buffer {
        if at <= current.start {
            *buffer = None;
        } else if at < current.end {
            current.end = at;
        }
    }
}
