//! Chunk plans and helpers for checking that parser state does not depend on
//! where the input was split.

use crate::parser::{Parser, ParserSnapshot};
use crate::shared::TokenKind;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BoundaryPolicy {
    /// Chunks are split on character boundaries and fed through `parse`.
    Utf8Aligned,
    /// Chunks may split characters and are fed through `push_bytes`.
    ByteStream,
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryPolicy::Utf8Aligned => f.write_str("utf8"),
            BoundaryPolicy::ByteStream => f.write_str("bytes"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChunkPlan {
    Fixed {
        size: usize,
        policy: BoundaryPolicy,
    },
    Sizes {
        sizes: Vec<usize>,
        policy: BoundaryPolicy,
    },
    Boundaries {
        indices: Vec<usize>,
        policy: BoundaryPolicy,
    },
}

impl fmt::Display for ChunkPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkPlan::Fixed { size, policy } => {
                write!(f, "fixed size={size} policy={policy}")
            }
            ChunkPlan::Sizes { sizes, policy } => {
                write!(
                    f,
                    "sizes count={} policy={policy} sizes={sizes:?}",
                    sizes.len()
                )
            }
            ChunkPlan::Boundaries { indices, policy } => {
                write!(
                    f,
                    "boundaries count={} policy={policy} indices={indices:?}",
                    indices.len()
                )
            }
        }
    }
}

impl ChunkPlan {
    pub fn fixed(size: usize) -> Self {
        Self::Fixed {
            size,
            policy: BoundaryPolicy::Utf8Aligned,
        }
    }

    pub fn fixed_unaligned(size: usize) -> Self {
        Self::Fixed {
            size,
            policy: BoundaryPolicy::ByteStream,
        }
    }

    pub fn sizes(sizes: impl Into<Vec<usize>>) -> Self {
        Self::Sizes {
            sizes: sizes.into(),
            policy: BoundaryPolicy::Utf8Aligned,
        }
    }

    pub fn sizes_unaligned(sizes: impl Into<Vec<usize>>) -> Self {
        Self::Sizes {
            sizes: sizes.into(),
            policy: BoundaryPolicy::ByteStream,
        }
    }

    pub fn boundaries(indices: impl Into<Vec<usize>>) -> Self {
        Self::Boundaries {
            indices: indices.into(),
            policy: BoundaryPolicy::Utf8Aligned,
        }
    }

    pub fn boundaries_unaligned(indices: impl Into<Vec<usize>>) -> Self {
        Self::Boundaries {
            indices: indices.into(),
            policy: BoundaryPolicy::ByteStream,
        }
    }

    pub fn policy(&self) -> BoundaryPolicy {
        match self {
            ChunkPlan::Fixed { policy, .. }
            | ChunkPlan::Sizes { policy, .. }
            | ChunkPlan::Boundaries { policy, .. } => *policy,
        }
    }

    /// Call `f` with each chunk of `input` in order. Boundaries that the
    /// policy disallows are dropped rather than reported.
    pub fn for_each_chunk(&self, input: &str, mut f: impl FnMut(&[u8])) {
        let bytes = input.as_bytes();
        let mut last = 0usize;
        for idx in plan_boundaries(self, input) {
            f(&bytes[last..idx]);
            last = idx;
        }
        if last < bytes.len() {
            f(&bytes[last..]);
        }
    }
}

pub(crate) fn filter_boundaries_by_policy(
    input: &str,
    indices: &[usize],
    policy: BoundaryPolicy,
) -> Vec<usize> {
    let len = input.len();
    let mut out = Vec::new();
    for &idx in indices {
        if idx == 0 || idx >= len {
            continue;
        }
        if matches!(policy, BoundaryPolicy::Utf8Aligned) && !input.is_char_boundary(idx) {
            continue;
        }
        out.push(idx);
    }
    out
}

/// Parse `input` as a single chunk.
pub fn run_full(input: &str) -> ParserSnapshot {
    let mut parser = Parser::new();
    parser.parse(input);
    parser.snapshot()
}

pub fn run_chunked(input: &str, plan: &ChunkPlan) -> ParserSnapshot {
    run_chunked_with_tokens(input, plan).0
}

/// Parse `input` split according to `plan`, also collecting every raw token
/// with its chunk-local text.
pub fn run_chunked_with_tokens(
    input: &str,
    plan: &ChunkPlan,
) -> (ParserSnapshot, Vec<(TokenKind, String)>) {
    let mut parser = Parser::new();
    let mut tokens = Vec::new();
    match plan.policy() {
        BoundaryPolicy::Utf8Aligned => {
            plan.for_each_chunk(input, |chunk| {
                let text = std::str::from_utf8(chunk)
                    .unwrap_or_else(|err| panic!("aligned plan split a character: {err}"));
                parser.parse_with(text, |token| {
                    tokens.push((token.kind, token.text(text).to_string()));
                });
            });
        }
        BoundaryPolicy::ByteStream => {
            plan.for_each_chunk(input, |chunk| {
                parser
                    .push_bytes(chunk)
                    .unwrap_or_else(|err| panic!("lossy push_bytes failed: {err}"));
            });
            parser
                .finish()
                .unwrap_or_else(|err| panic!("lossy finish failed: {err}"));
        }
    }
    (parser.snapshot(), tokens)
}

pub fn deterministic_chunk_plans(input: &str) -> Vec<ChunkPlan> {
    let mut plans = Vec::new();
    for size in [1usize, 2, 3, 4, 7, 16, 64] {
        plans.push(ChunkPlan::fixed(size));
    }
    if let Some(boundaries) = every_byte_boundaries(input, 128) {
        plans.push(ChunkPlan::boundaries(boundaries.clone()));
        plans.push(ChunkPlan::boundaries_unaligned(boundaries));
    }
    let semantic_raw = semantic_boundaries(input, 256);
    if !semantic_raw.is_empty() {
        let semantic_aligned =
            filter_boundaries_by_policy(input, &semantic_raw, BoundaryPolicy::Utf8Aligned);
        if !semantic_aligned.is_empty() {
            plans.push(ChunkPlan::boundaries(semantic_aligned));
        }
        plans.push(ChunkPlan::boundaries_unaligned(semantic_raw));
    }
    plans
}

pub struct FuzzChunkPlan {
    pub plan: ChunkPlan,
    pub summary: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FuzzMode {
    Sizes,
    Boundaries,
    Semantic,
    Mixed,
}

#[derive(Clone, Copy, Debug)]
pub struct ShrinkStats {
    pub original_boundaries: usize,
    pub minimized_boundaries: usize,
    pub checks: usize,
    pub policy_upgraded: bool,
    pub budget_exhausted: bool,
}

/// Reduce a failing plan to as few boundaries as possible while `fails`
/// keeps returning true.
pub fn shrink_chunk_plan_with_stats(
    input: &str,
    plan: &ChunkPlan,
    mut fails: impl FnMut(&ChunkPlan) -> bool,
) -> (ChunkPlan, ShrinkStats) {
    let policy = plan.policy();
    let max_checks = shrink_budget();
    let mut checks = 0usize;
    let mut budget_exhausted = false;
    let mut policy_upgraded = false;

    let mut boundaries = plan_boundaries(plan, input);
    let original_boundaries = boundaries.len();

    // Drop one boundary at a time until no single removal still fails.
    let mut changed = true;
    while changed && !budget_exhausted {
        changed = false;
        let mut i = 0usize;
        while i < boundaries.len() {
            let mut candidate = boundaries.clone();
            candidate.remove(i);
            let candidate_plan = ChunkPlan::Boundaries {
                indices: candidate.clone(),
                policy,
            };
            checks += 1;
            if checks >= max_checks {
                budget_exhausted = true;
                break;
            }
            if fails(&candidate_plan) {
                boundaries = candidate;
                changed = true;
            } else {
                i += 1;
            }
        }
    }

    let mut minimized_policy = policy;
    if !budget_exhausted && policy == BoundaryPolicy::ByteStream {
        let aligned = filter_boundaries_by_policy(input, &boundaries, BoundaryPolicy::Utf8Aligned);
        let candidate_plan = ChunkPlan::boundaries(aligned.clone());
        checks += 1;
        if checks >= max_checks {
            budget_exhausted = true;
        } else if fails(&candidate_plan) {
            minimized_policy = BoundaryPolicy::Utf8Aligned;
            boundaries = aligned;
            policy_upgraded = true;
        }
    }

    let minimized_boundaries = boundaries.len();
    (
        ChunkPlan::Boundaries {
            indices: boundaries,
            policy: minimized_policy,
        },
        ShrinkStats {
            original_boundaries,
            minimized_boundaries,
            checks,
            policy_upgraded,
            budget_exhausted,
        },
    )
}

pub fn shrink_chunk_plan(
    input: &str,
    plan: &ChunkPlan,
    fails: impl FnMut(&ChunkPlan) -> bool,
) -> ChunkPlan {
    shrink_chunk_plan_with_stats(input, plan, fails).0
}

pub fn random_chunk_plan(input: &str, seed: u64, mode: FuzzMode) -> FuzzChunkPlan {
    let mut rng = LcgRng::new(seed);
    let len = input.len();
    if len <= 1 {
        return FuzzChunkPlan {
            plan: ChunkPlan::fixed_unaligned(1),
            summary: format!("fixed_unaligned size=1 len={len} seed=0x{seed:016x}"),
        };
    }

    let semantic_raw = semantic_boundaries(input, 128);
    let want_semantic = !semantic_raw.is_empty()
        && (mode == FuzzMode::Semantic || (mode == FuzzMode::Mixed && rng.gen_ratio(1, 3)));
    let use_sizes = !want_semantic
        && (mode == FuzzMode::Sizes || (mode == FuzzMode::Mixed && rng.gen_ratio(1, 2)));

    if use_sizes {
        let max_chunks = len.min(32);
        let chunk_count = rng.gen_range_usize(1, max_chunks + 1);
        let sizes = random_sizes(&mut rng, len, chunk_count);
        let plan = if rng.gen_ratio(1, 2) {
            ChunkPlan::sizes(sizes.clone())
        } else {
            ChunkPlan::sizes_unaligned(sizes.clone())
        };
        let summary = format!("{plan} len={len} seed=0x{seed:016x}");
        return FuzzChunkPlan { plan, summary };
    }

    let indices = if want_semantic {
        random_semantic_boundaries(&mut rng, &semantic_raw, len)
    } else {
        let max_points = len.saturating_sub(1).min(64);
        let point_count = rng.gen_range_usize(1, max_points + 1);
        random_boundaries(&mut rng, len, point_count)
    };
    let aligned = filter_boundaries_by_policy(input, &indices, BoundaryPolicy::Utf8Aligned);
    let plan = if rng.gen_ratio(1, 2) && !aligned.is_empty() {
        ChunkPlan::boundaries(aligned)
    } else {
        ChunkPlan::boundaries_unaligned(indices)
    };
    let label = if want_semantic { "semantic" } else { "random" };
    let summary = format!("{label} {plan} len={len} seed=0x{seed:016x}");
    FuzzChunkPlan { plan, summary }
}

/// Sorted, deduplicated interior boundaries of `plan` over `input`.
fn plan_boundaries(plan: &ChunkPlan, input: &str) -> Vec<usize> {
    let len = input.len();
    let boundaries = match plan {
        ChunkPlan::Fixed { size, .. } => size_boundaries(std::iter::repeat(*size), len),
        ChunkPlan::Sizes { sizes, .. } => size_boundaries(sizes.iter().copied(), len),
        ChunkPlan::Boundaries { indices, .. } => indices.clone(),
    };
    let mut points = filter_boundaries_by_policy(input, &boundaries, plan.policy());
    points.sort_unstable();
    points.dedup();
    points
}

fn size_boundaries(sizes: impl Iterator<Item = usize>, len: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut offset = 0usize;
    for size in sizes {
        assert!(size > 0, "chunk size must be > 0");
        offset += size;
        if offset >= len {
            break;
        }
        out.push(offset);
    }
    out
}

fn shrink_budget() -> usize {
    if let Ok(value) = std::env::var("HTMLTOK_SHRINK_CHECKS")
        && let Ok(parsed) = value.parse::<usize>()
        && parsed > 0
    {
        return parsed;
    }
    if std::env::var("CI").is_ok() {
        1_000
    } else {
        10_000
    }
}

fn every_byte_boundaries(input: &str, max_len: usize) -> Option<Vec<usize>> {
    let len = input.len();
    if len <= 1 || len > max_len {
        return None;
    }
    Some((1..len).collect())
}

/// Offsets around bytes that end or begin a delimiter.
fn semantic_boundaries(input: &str, max_points: usize) -> Vec<usize> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    for (idx, &byte) in bytes.iter().enumerate() {
        if matches!(
            byte,
            b'<' | b'>' | b'!' | b'-' | b'[' | b']' | b'"' | b'\'' | b'/' | b'=' | b' '
        ) {
            out.push(idx);
            if idx + 1 < bytes.len() {
                out.push(idx + 1);
            }
        }
    }
    out.sort_unstable();
    out.dedup();
    out.retain(|&idx| idx > 0);
    out.truncate(max_points);
    out
}

fn random_sizes(rng: &mut LcgRng, len: usize, count: usize) -> Vec<usize> {
    let mut remaining = len;
    let mut sizes = Vec::with_capacity(count);
    for i in 0..count {
        if remaining == 0 {
            break;
        }
        let max_size = remaining.saturating_sub(count.saturating_sub(i + 1)).max(1);
        let biased_max = if rng.gen_ratio(7, 10) {
            max_size.clamp(1, 8)
        } else {
            max_size
        };
        let size = rng.gen_range_usize(1, biased_max + 1);
        sizes.push(size);
        remaining = remaining.saturating_sub(size);
    }
    sizes
}

fn random_boundaries(rng: &mut LcgRng, len: usize, count: usize) -> Vec<usize> {
    let mut out: Vec<usize> = (0..count).map(|_| rng.gen_range_usize(1, len)).collect();
    out.sort_unstable();
    out.dedup();
    out
}

fn random_semantic_boundaries(rng: &mut LcgRng, base: &[usize], len: usize) -> Vec<usize> {
    if base.is_empty() || len <= 1 {
        return Vec::new();
    }
    let max_points = base.len().min(32);
    let pick_count = rng.gen_range_usize(1, max_points + 1);
    let mut out = Vec::with_capacity(pick_count);
    for _ in 0..pick_count {
        let idx = base[rng.gen_index(base.len())];
        let jittered = if rng.gen_ratio(1, 2) {
            idx
        } else if rng.gen_ratio(1, 2) {
            idx.saturating_sub(1).max(1)
        } else {
            (idx + 1).min(len - 1)
        };
        if jittered > 0 && jittered < len {
            out.push(jittered);
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

pub(crate) struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub(crate) fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    pub(crate) fn gen_range_usize(&mut self, start: usize, end: usize) -> usize {
        assert!(start < end, "invalid range: {start}..{end}");
        let span = (end - start) as u64;
        (self.next_u64() % span) as usize + start
    }

    fn gen_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "invalid length: {len}");
        self.gen_range_usize(0, len)
    }

    pub(crate) fn gen_ratio(&mut self, numerator: u32, denominator: u32) -> bool {
        assert!(denominator > 0, "invalid denominator: {denominator}");
        let roll = (self.next_u64() % denominator as u64) as u32;
        roll < numerator
    }
}
