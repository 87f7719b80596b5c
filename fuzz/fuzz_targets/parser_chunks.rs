#![no_main]

use html_tokenizer::Parser;
use libfuzzer_sys::fuzz_target;

// The first byte seeds the split points; the rest is the document.
fuzz_target!(|data: &[u8]| {
    let Some((&seed, bytes)) = data.split_first() else {
        return;
    };

    let mut whole = Parser::new();
    whole.parse(&String::from_utf8_lossy(bytes));

    let mut chunked = Parser::new();
    let step = usize::from(seed % 17) + 1;
    for chunk in bytes.chunks(step) {
        if chunked.push_bytes(chunk).is_err() {
            return;
        }
    }
    if chunked.finish().is_err() {
        return;
    }

    assert_eq!(whole.document(), chunked.document());
    assert_eq!(whole.snapshot(), chunked.snapshot(), "step={step}");
});
