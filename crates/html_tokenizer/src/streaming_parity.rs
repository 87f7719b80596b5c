//! Streaming parity between `push_bytes` at arbitrary byte offsets and a
//! single `parse` of the lossily decoded input.
//!
//! Fast CI mode: default seeds and budget when `CI` is set.
//! Extended local mode: set `HTMLTOK_STREAMING_PARITY_SEEDS` and
//! `HTMLTOK_STREAMING_PARITY_BUDGET` to increase coverage.

use crate::parser::{Parser, ParserSnapshot};
use crate::test_harness::LcgRng;

const DEFAULT_BUDGET_CI: usize = 300;
const DEFAULT_BUDGET_LOCAL: usize = 1_500;
const DEFAULT_SEEDS_CI: usize = 50;
const DEFAULT_SEEDS_LOCAL: usize = 200;
const SEED_MIX: u64 = 0x9e3779b97f4a7c15;

#[test]
fn streaming_parity_push_bytes_matches_whole_parse() {
    let cases: [&[u8]; 7] = [
        b"plain ascii",
        "<p title='caf\u{e9}'>".as_bytes(),
        "e\u{0301}<!-- \u{1F600} -->".as_bytes(),
        "<script>\u{1F468}\u{200D}\u{1F469}</script>\u{f6}".as_bytes(),
        "<![CDATA[\u{e9}]]><a b=\u{fc}".as_bytes(),
        b"<a b='\xFF'>\xC3",
        b"<title>\xE2\x82</title",
    ];
    let seeds = seed_count();
    let budget = run_budget();
    assert!(
        budget >= cases.len(),
        "streaming parity budget must be >= number of cases; increase HTMLTOK_STREAMING_PARITY_BUDGET"
    );
    let case_budget = (budget / cases.len()).max(1);

    for (case_idx, bytes) in cases.iter().enumerate() {
        let expected = whole_parse(bytes);
        let base_seed = 0x4f6f726f6d207574 ^ case_idx as u64;
        let mut remaining = case_budget;

        let mut check = |seed: Option<u64>, boundaries: &[usize]| {
            assert_parity(case_idx, seed, bytes, boundaries, &expected);
            remaining = remaining.saturating_sub(1);
            remaining > 0
        };

        if !check(None, &[]) {
            continue;
        }
        let every_byte: Vec<usize> = (1..bytes.len()).collect();
        if !check(None, &every_byte) {
            continue;
        }
        for iter in 0..seeds {
            let seed = base_seed ^ (iter as u64).wrapping_mul(SEED_MIX);
            let mut rng = LcgRng::new(seed);
            let boundaries = random_boundaries(&mut rng, bytes.len());
            if !check(Some(seed), &boundaries) {
                break;
            }
        }
    }
}

#[test]
fn streaming_parity_replaces_invalid_utf8() {
    let mut parser = Parser::new();
    for byte in [0xFFu8, b'f', 0xC3] {
        parser.push_bytes(&[byte]).unwrap();
    }
    parser.finish().unwrap();
    assert_eq!(parser.document(), "\u{FFFD}f\u{FFFD}");
}

fn whole_parse(bytes: &[u8]) -> ParserSnapshot {
    let mut parser = Parser::new();
    parser.parse(&String::from_utf8_lossy(bytes));
    parser.snapshot()
}

fn assert_parity(
    case_idx: usize,
    seed: Option<u64>,
    bytes: &[u8],
    boundaries: &[usize],
    expected: &ParserSnapshot,
) {
    let mut parser = Parser::new();
    let mut last = 0usize;
    for &idx in boundaries.iter().chain(std::iter::once(&bytes.len())) {
        assert!(idx >= last && idx <= bytes.len(), "invalid boundary {idx}");
        parser.push_bytes(&bytes[last..idx]).unwrap();
        last = idx;
    }
    parser.finish().unwrap();

    let expected_doc = String::from_utf8_lossy(bytes);
    let seed_label = seed
        .map(|seed| format!("seed=0x{seed:016x}"))
        .unwrap_or_else(|| "seed=explicit".to_string());
    assert_eq!(
        parser.document(),
        expected_doc,
        "document mismatch for case={case_idx} {seed_label} boundaries={boundaries:?}"
    );
    assert_eq!(
        &parser.snapshot(),
        expected,
        "state mismatch for case={case_idx} {seed_label} boundaries={boundaries:?}"
    );
}

fn seed_count() -> usize {
    if let Ok(value) = std::env::var("HTMLTOK_STREAMING_PARITY_SEEDS")
        && let Ok(parsed) = value.parse::<usize>()
        && parsed > 0
    {
        return parsed;
    }
    if std::env::var("CI").is_ok() {
        DEFAULT_SEEDS_CI
    } else {
        DEFAULT_SEEDS_LOCAL
    }
}

fn run_budget() -> usize {
    if let Ok(value) = std::env::var("HTMLTOK_STREAMING_PARITY_BUDGET")
        && let Ok(parsed) = value.parse::<usize>()
        && parsed > 0
    {
        return parsed;
    }
    if std::env::var("CI").is_ok() {
        DEFAULT_BUDGET_CI
    } else {
        DEFAULT_BUDGET_LOCAL
    }
}

fn random_boundaries(rng: &mut LcgRng, len: usize) -> Vec<usize> {
    if len <= 1 {
        return Vec::new();
    }
    let max_points = (len - 1).min(64);
    let count = rng.gen_range_usize(0, max_points + 1);
    let mut out: Vec<usize> = (0..count).map(|_| rng.gen_range_usize(1, len)).collect();
    out.sort_unstable();
    out.dedup();
    out
}
