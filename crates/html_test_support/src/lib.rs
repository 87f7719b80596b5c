//! Fixture loaders and diff helpers shared by the tokenizer's integration
//! tests.

use html_tokenizer::ParserSnapshot;
use std::fmt::Write;

pub mod golden;
pub mod parser_cases;

fn line(lines: &[String], idx: usize) -> &str {
    lines.get(idx).map_or("<missing>", String::as_str)
}

pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    let max = expected.len().max(actual.len());
    let mut out = String::new();
    let mismatch = (0..max).find(|&i| line(expected, i) != line(actual, i));
    if let Some(i) = mismatch {
        let start = i.saturating_sub(2);
        let end = (i + 3).min(max);
        let _ = writeln!(
            &mut out,
            "first mismatch at line {} (showing {}..={}):",
            i + 1,
            start + 1,
            end
        );
        for idx in start..end {
            let marker = if idx == i { ">" } else { " " };
            let _ = writeln!(&mut out, "{marker} {:>4}  expected: {}", idx + 1, line(expected, idx));
            let _ = writeln!(&mut out, "{marker} {:>4}    actual: {}", idx + 1, line(actual, idx));
        }
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}

/// One `field=value` line per snapshot field, for readable diffs.
pub fn snapshot_lines(snapshot: &ParserSnapshot) -> Vec<String> {
    let text = |value: &Option<String>| match value {
        Some(value) => format!("{value:?}"),
        None => "none".to_string(),
    };
    vec![
        format!("context={}", snapshot.context),
        format!("tag_name={}", text(&snapshot.tag_name)),
        format!("closing_tag={}", snapshot.closing_tag),
        format!("self_closing_tag={}", snapshot.self_closing_tag),
        format!("attribute_name={}", text(&snapshot.attribute_name)),
        format!("attribute_value={}", text(&snapshot.attribute_value)),
        format!("attribute_quoted={}", snapshot.attribute_quoted),
        format!("comment_text={}", text(&snapshot.comment_text)),
        format!("cdata_text={}", text(&snapshot.cdata_text)),
        format!("rawtext_text={}", text(&snapshot.rawtext_text)),
    ]
}

/// Substring filter read from an environment variable.
pub struct FixtureFilter {
    raw: Option<String>,
}

impl FixtureFilter {
    pub fn from_env(key: &str) -> Self {
        Self {
            raw: std::env::var(key).ok().filter(|value| !value.is_empty()),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.raw.as_deref().is_none_or(|filter| name.contains(filter))
    }
}

pub fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}
