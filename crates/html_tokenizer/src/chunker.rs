//! Labelled chunk plans for fixture-driven tests.
//!
//! Combines fixed sizes, splits on both sides of every delimiter byte and a
//! number of seeded random plans so that CI failures are reproducible.

use crate::test_harness::{BoundaryPolicy, ChunkPlan, LcgRng, filter_boundaries_by_policy};

#[derive(Clone, Debug)]
pub struct ChunkPlanCase {
    pub label: String,
    pub plan: ChunkPlan,
}

#[derive(Clone, Copy, Debug)]
pub struct ChunkerConfig {
    pub policy: BoundaryPolicy,
}

impl ChunkerConfig {
    pub fn utf8() -> Self {
        Self {
            policy: BoundaryPolicy::Utf8Aligned,
        }
    }

    pub fn byte_stream() -> Self {
        Self {
            policy: BoundaryPolicy::ByteStream,
        }
    }
}

pub fn build_chunk_plans(
    input: &str,
    fuzz_runs: usize,
    fuzz_seed: u64,
    config: ChunkerConfig,
) -> Vec<ChunkPlanCase> {
    let policy = config.policy;
    let mut plans = Vec::new();

    for size in [1usize, 2, 3, 4, 8, 16, 32, 64] {
        plans.push(ChunkPlanCase {
            label: format!("fixed size={size}"),
            plan: fixed_plan(size, policy),
        });
    }

    let delimiters = delimiter_boundaries(input, policy);
    if !delimiters.is_empty() {
        plans.push(ChunkPlanCase {
            label: format!("delimiters count={}", delimiters.len()),
            plan: boundaries_plan(delimiters.clone(), policy),
        });
    }

    let mut candidates = char_boundaries(input, policy);
    candidates.extend_from_slice(&delimiters);
    candidates.sort_unstable();
    candidates.dedup();
    for i in 0..fuzz_runs {
        let seed = fuzz_seed.wrapping_add(i as u64);
        let plan = if candidates.is_empty() {
            fixed_plan(1, policy)
        } else {
            let mut rng = LcgRng::new(seed);
            let count = rng.gen_range_usize(1, candidates.len().min(32) + 1);
            let mut picks: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|_| rng.gen_ratio(1, 2))
                .take(count)
                .collect();
            if picks.is_empty() {
                picks.push(candidates[rng.gen_range_usize(0, candidates.len())]);
            }
            boundaries_plan(picks, policy)
        };
        plans.push(ChunkPlanCase {
            label: format!("fuzz seed=0x{seed:016x}"),
            plan,
        });
    }

    plans
}

pub fn build_chunk_plans_utf8(input: &str, fuzz_runs: usize, fuzz_seed: u64) -> Vec<ChunkPlanCase> {
    build_chunk_plans(input, fuzz_runs, fuzz_seed, ChunkerConfig::utf8())
}

fn fixed_plan(size: usize, policy: BoundaryPolicy) -> ChunkPlan {
    match policy {
        BoundaryPolicy::Utf8Aligned => ChunkPlan::fixed(size),
        BoundaryPolicy::ByteStream => ChunkPlan::fixed_unaligned(size),
    }
}

fn boundaries_plan(indices: Vec<usize>, policy: BoundaryPolicy) -> ChunkPlan {
    match policy {
        BoundaryPolicy::Utf8Aligned => ChunkPlan::boundaries(indices),
        BoundaryPolicy::ByteStream => ChunkPlan::boundaries_unaligned(indices),
    }
}

/// Offsets on both sides of `<`, `>`, quotes, `-`, `]` and the `/` of `</`.
fn delimiter_boundaries(input: &str, policy: BoundaryPolicy) -> Vec<usize> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    for (i, &b) in bytes.iter().enumerate() {
        let delimiter = matches!(b, b'<' | b'>' | b'"' | b'\'' | b'-' | b']')
            || (b == b'/' && i > 0 && bytes[i - 1] == b'<');
        if delimiter {
            out.push(i);
            out.push(i + 1);
        }
    }
    out.sort_unstable();
    out.dedup();
    filter_boundaries_by_policy(input, &out, policy)
}

fn char_boundaries(input: &str, policy: BoundaryPolicy) -> Vec<usize> {
    let indices: Vec<usize> = input.char_indices().map(|(idx, _)| idx).collect();
    filter_boundaries_by_policy(input, &indices, policy)
}
