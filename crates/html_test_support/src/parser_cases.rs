//! TOML parser fixtures: a sequence of chunks and the state expected after
//! the last one. Fields left out of `expect` are not checked.
//!
//! ```toml
//! format = "html-parser-v1"
//!
//! [[case]]
//! name = "open attribute value"
//! chunks = ["<div foo='", "ba"]
//! expect = { context = "quoted_value", attribute_value = "ba" }
//! ```

use html_tokenizer::{Context, ParserSnapshot};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const PARSER_FORMAT_V1: &str = "html-parser-v1";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserCaseFile {
    pub format: String,
    #[serde(rename = "case", default)]
    pub cases: Vec<ParserCase>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserCase {
    pub name: String,
    pub chunks: Vec<String>,
    pub expect: ExpectedState,
}

impl ParserCase {
    pub fn input(&self) -> String {
        self.chunks.concat()
    }
}

/// A string field may be a value or `false` to assert the buffer is absent.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ExpectedText {
    Absent(bool),
    Value(String),
}

impl ExpectedText {
    fn matches(&self, actual: Option<&str>) -> bool {
        match self {
            ExpectedText::Absent(false) => actual.is_none(),
            ExpectedText::Absent(true) => actual.is_some(),
            ExpectedText::Value(value) => actual == Some(value.as_str()),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedState {
    pub context: Option<String>,
    pub tag_name: Option<ExpectedText>,
    pub closing_tag: Option<bool>,
    pub self_closing_tag: Option<bool>,
    pub attribute_name: Option<ExpectedText>,
    pub attribute_value: Option<ExpectedText>,
    pub attribute_quoted: Option<bool>,
    pub comment_text: Option<ExpectedText>,
    pub cdata_text: Option<ExpectedText>,
    pub rawtext_text: Option<ExpectedText>,
}

impl ExpectedState {
    /// Describe every field of `snapshot` that disagrees with the expectation.
    pub fn mismatches(&self, snapshot: &ParserSnapshot) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(name) = &self.context {
            match Context::from_name(name) {
                Some(context) if context == snapshot.context => {}
                Some(_) => out.push(format!(
                    "context: expected {name}, actual {}",
                    snapshot.context
                )),
                None => out.push(format!("context: unknown name '{name}'")),
            }
        }
        let texts = [
            ("tag_name", &self.tag_name, &snapshot.tag_name),
            ("attribute_name", &self.attribute_name, &snapshot.attribute_name),
            ("attribute_value", &self.attribute_value, &snapshot.attribute_value),
            ("comment_text", &self.comment_text, &snapshot.comment_text),
            ("cdata_text", &self.cdata_text, &snapshot.cdata_text),
            ("rawtext_text", &self.rawtext_text, &snapshot.rawtext_text),
        ];
        for (field, expected, actual) in texts {
            if let Some(expected) = expected
                && !expected.matches(actual.as_deref())
            {
                out.push(format!("{field}: expected {expected:?}, actual {actual:?}"));
            }
        }
        let flags = [
            ("closing_tag", self.closing_tag, snapshot.closing_tag),
            ("self_closing_tag", self.self_closing_tag, snapshot.self_closing_tag),
            ("attribute_quoted", self.attribute_quoted, snapshot.attribute_quoted),
        ];
        for (field, expected, actual) in flags {
            if let Some(expected) = expected
                && expected != actual
            {
                out.push(format!("{field}: expected {expected}, actual {actual}"));
            }
        }
        out
    }
}

pub fn parse_parser_cases(content: &str) -> Result<Vec<ParserCase>, String> {
    let file: ParserCaseFile = toml::from_str(content).map_err(|err| err.to_string())?;
    if file.format != PARSER_FORMAT_V1 {
        return Err(format!("unsupported format '{}'", file.format));
    }
    if file.cases.is_empty() {
        return Err("no cases".to_string());
    }
    Ok(file.cases)
}

/// Load every `*.toml` file under `root`; case names are prefixed with the
/// file stem.
pub fn load_parser_cases(root: &Path) -> Vec<ParserCase> {
    let mut paths: Vec<_> = fs::read_dir(root)
        .unwrap_or_else(|err| panic!("failed to read fixture root {root:?}: {err}"))
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    let mut cases = Vec::new();
    for path in paths {
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|err| panic!("failed to read parser fixture {path:?}: {err}"));
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let parsed = parse_parser_cases(&content)
            .unwrap_or_else(|err| panic!("invalid parser fixture {path:?}: {err}"));
        cases.extend(parsed.into_iter().map(|mut case| {
            case.name = format!("{stem}/{}", case.name);
            case
        }));
    }
    cases
}
