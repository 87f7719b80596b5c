//! Command-line front end: streams a file (or stdin) through the parser in
//! fixed-size byte chunks and prints the tokens of every chunk.

use anyhow::{Context as _, Result};
use clap::{Parser as ClapParser, ValueEnum};
use html_tokenizer::{Parser, ParserConfig, ParserSnapshot, Token, Utf8Policy, format_token};
use mimalloc::MiMalloc;
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::PathBuf;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Tokenize HTML incrementally and report parser state.
#[derive(Debug, ClapParser)]
#[command(name = "htmltok", version)]
struct Cli {
    /// Input file. Reads stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Feed the input in chunks of this many bytes (0 = one chunk).
    #[arg(long, default_value_t = 0)]
    chunk_size: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Fail on malformed UTF-8 instead of replacing it.
    #[arg(long)]
    strict_utf8: bool,

    /// Print the final parser state after the tokens.
    #[arg(long)]
    state: bool,
}

#[derive(Debug, Serialize)]
struct TokenRecord {
    chunk: usize,
    offset: usize,
    kind: &'static str,
    text: String,
    #[serde(skip)]
    line: String,
}

#[derive(Debug, Serialize)]
struct StateRecord {
    context: &'static str,
    tag_name: Option<String>,
    attribute_name: Option<String>,
    attribute_value: Option<String>,
    attribute_quoted: bool,
    closing_tag: bool,
    self_closing_tag: bool,
    comment_text: Option<String>,
    cdata_text: Option<String>,
    rawtext_text: Option<String>,
}

impl From<ParserSnapshot> for StateRecord {
    fn from(snapshot: ParserSnapshot) -> Self {
        Self {
            context: snapshot.context.as_str(),
            tag_name: snapshot.tag_name,
            attribute_name: snapshot.attribute_name,
            attribute_value: snapshot.attribute_value,
            attribute_quoted: snapshot.attribute_quoted,
            closing_tag: snapshot.closing_tag,
            self_closing_tag: snapshot.self_closing_tag,
            comment_text: snapshot.comment_text,
            cdata_text: snapshot.cdata_text,
            rawtext_text: snapshot.rawtext_text,
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    tokens: Vec<TokenRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<StateRecord>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let bytes = read_input(cli.input.as_ref())?;
    let utf8 = if cli.strict_utf8 {
        Utf8Policy::Strict
    } else {
        Utf8Policy::Lossy
    };
    let mut parser = Parser::with_config(ParserConfig { utf8 });

    let chunk_size = if cli.chunk_size == 0 {
        bytes.len().max(1)
    } else {
        cli.chunk_size
    };
    log::info!("tokenizing {} bytes in chunks of {chunk_size}", bytes.len());

    let mut records = Vec::new();
    for (index, chunk) in bytes.chunks(chunk_size).enumerate() {
        let start = parser.document_len();
        let mut tokens = Vec::new();
        let pushed = parser.push_bytes_with(chunk, |token| tokens.push(token));
        collect_records(&parser, index, start, &tokens, &mut records)?;
        pushed.with_context(|| format!("decoding chunk {index}"))?;
    }
    let start = parser.document_len();
    let mut tokens = Vec::new();
    let finished = parser.finish_with(|token| tokens.push(token));
    collect_records(
        &parser,
        bytes.len().div_ceil(chunk_size),
        start,
        &tokens,
        &mut records,
    )?;
    finished.context("decoding end of input")?;

    let stats = parser.stats();
    log::info!(
        "{} chunks, {} tokens, {} state transitions",
        stats.chunks,
        stats.tokenizer.tokens_emitted,
        stats.tokenizer.state_transitions
    );

    let report = Report {
        tokens: records,
        state: cli.state.then(|| StateRecord::from(parser.snapshot())),
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Text => write_text(&mut out, &report)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &report).context("writing JSON report")?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

/// Resolve the tokens of one call against the text it appended to the
/// document.
fn collect_records(
    parser: &Parser,
    chunk: usize,
    start: usize,
    tokens: &[Token],
    out: &mut Vec<TokenRecord>,
) -> Result<()> {
    if tokens.is_empty() {
        return Ok(());
    }
    let text = parser
        .extract(start, parser.document_len())
        .context("resolving chunk text")?;
    for token in tokens {
        let line = format_token(token, text)
            .with_context(|| format!("formatting token of chunk {chunk}"))?;
        out.push(TokenRecord {
            chunk,
            offset: start + token.start,
            kind: token.kind.as_str(),
            text: token.text(text).to_string(),
            line,
        });
    }
    Ok(())
}

fn write_text(out: &mut impl Write, report: &Report) -> Result<()> {
    for record in &report.tokens {
        writeln!(out, "{:>4} {:>8} {}", record.chunk, record.offset, record.line)?;
    }
    if let Some(state) = &report.state {
        writeln!(out, "context={}", state.context)?;
        let fields = [
            ("tag_name", &state.tag_name),
            ("attribute_name", &state.attribute_name),
            ("attribute_value", &state.attribute_value),
            ("comment_text", &state.comment_text),
            ("cdata_text", &state.cdata_text),
            ("rawtext_text", &state.rawtext_text),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                writeln!(out, "{name}={value:?}")?;
            }
        }
        writeln!(out, "attribute_quoted={}", state.attribute_quoted)?;
        writeln!(out, "closing_tag={}", state.closing_tag)?;
        writeln!(out, "self_closing_tag={}", state.self_closing_tag)?;
    }
    Ok(())
}
