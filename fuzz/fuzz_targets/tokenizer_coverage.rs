#![no_main]

use html_tokenizer::{MachineState, scan};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let mut state = MachineState::default();
    for chunk in split_on_char_boundaries(&input, 7) {
        let mut cursor = 0usize;
        state = scan(chunk, state, |token| {
            assert_eq!(token.start, cursor, "tokens must be contiguous");
            assert!(token.end > token.start, "tokens must be non-empty");
            assert!(chunk.is_char_boundary(token.end));
            cursor = token.end;
        });
        assert_eq!(cursor, chunk.len(), "tokens must cover the chunk");
    }
});

fn split_on_char_boundaries(input: &str, size: usize) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    while start < input.len() {
        let mut end = (start + size).min(input.len());
        while !input.is_char_boundary(end) {
            end += 1;
        }
        out.push(&input[start..end]);
        start = end;
    }
    out
}
