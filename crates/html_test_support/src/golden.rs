//! Golden tokenizer fixtures.
//!
//! Each fixture is a directory holding `input.html` and `tokens.txt`. The
//! token file starts with `#` headers (`format` is required and must come
//! first; `status` and `reason` are optional) followed by one formatted token
//! per line.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const TOKEN_FORMAT_V1: &str = "html-token-v1";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FixtureStatus {
    Active,
    Xfail,
    Skip,
}

#[derive(Clone, Debug)]
pub struct TokenFixture {
    pub name: String,
    pub input: String,
    pub status: FixtureStatus,
    pub reason: Option<String>,
    pub lines: Vec<String>,
}

/// Load every fixture directory under `root`, sorted by name.
pub fn load_token_fixtures(root: &Path) -> Vec<TokenFixture> {
    let mut entries: Vec<_> = fs::read_dir(root)
        .unwrap_or_else(|err| panic!("failed to read fixture root {root:?}: {err}"))
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .collect();
    entries.sort_by_key(|entry| entry.file_name());

    let mut fixtures = Vec::new();
    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        assert_eq!(
            name,
            name.trim(),
            "fixture directory has leading/trailing whitespace"
        );
        let path = entry.path();
        let input_path = path.join("input.html");
        let input = fs::read_to_string(&input_path)
            .unwrap_or_else(|err| panic!("failed to read input {input_path:?}: {err}"));
        let content = fs::read_to_string(path.join("tokens.txt"))
            .unwrap_or_else(|err| panic!("failed to read tokens for '{name}': {err}"));
        let (status, reason, lines) = parse_tokens(&content)
            .unwrap_or_else(|err| panic!("invalid tokens file for '{name}': {err}"));
        fixtures.push(TokenFixture {
            name,
            input,
            status,
            reason,
            lines,
        });
    }
    fixtures
}

/// Parse a token file body into its status, reason and token lines.
pub fn parse_tokens(
    content: &str,
) -> Result<(FixtureStatus, Option<String>, Vec<String>), String> {
    let mut headers = BTreeMap::<String, String>::new();
    let mut lines = Vec::new();
    for raw_line in content.lines() {
        let line = raw_line.trim_end();
        if line.is_empty() {
            continue;
        }
        let Some(header) = line.strip_prefix('#') else {
            lines.push(line.to_string());
            continue;
        };
        let (key, value) = header
            .split_once(':')
            .ok_or_else(|| format!("invalid header '{line}'"))?;
        let key = key.trim().to_ascii_lowercase();
        if !matches!(key.as_str(), "format" | "status" | "reason") {
            return Err(format!("unsupported header '{key}'"));
        }
        if headers.is_empty() && key != "format" {
            return Err(format!("first header must be 'format', found '{key}'"));
        }
        if headers.insert(key.clone(), value.trim().to_string()).is_some() {
            return Err(format!("duplicate header '{key}'"));
        }
    }

    match headers.get("format") {
        Some(format) if format == TOKEN_FORMAT_V1 => {}
        Some(other) => return Err(format!("unsupported format '{other}'")),
        None => return Err("missing format header".to_string()),
    }
    let status = match headers.get("status").map(String::as_str) {
        Some("active") | None => FixtureStatus::Active,
        Some("xfail") => FixtureStatus::Xfail,
        Some("skip") => FixtureStatus::Skip,
        Some(other) => return Err(format!("unsupported status '{other}'")),
    };
    let reason = headers.get("reason").cloned().filter(|r| !r.is_empty());
    if status != FixtureStatus::Active && reason.is_none() {
        return Err("non-active fixture missing reason".to_string());
    }
    if lines.is_empty() {
        return Err("no token lines".to_string());
    }
    Ok((status, reason, lines))
}
