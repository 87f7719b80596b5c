use super::{Context, Parser, ParserConfig, Utf8Policy};
use crate::rawtext::RawTextElement;
use crate::shared::{ExtractError, TokenKind};

fn parse(parts: &[&str]) -> Parser {
    let mut parser = Parser::new();
    feed(&mut parser, parts);
    parser
}

fn feed(parser: &mut Parser, parts: &[&str]) {
    for part in parts {
        parser.parse(part);
    }
}

#[test]
fn empty_context() {
    let parser = parse(&[]);
    assert_eq!(parser.context(), Context::None);
    assert_eq!(parser.tag_name(), None);
}

#[test]
fn open_tag() {
    let parser = parse(&["<div"]);
    assert_eq!(parser.context(), Context::TagName);
    assert_eq!(parser.tag_name(), Some("div"));
    assert!(!parser.is_closing_tag());
}

#[test]
fn open_attribute_value() {
    let mut parser = parse(&["<div \"foo"]);
    assert_eq!(parser.context(), Context::QuotedValue);
    assert_eq!(parser.attribute_value(), Some("foo"));
    feed(&mut parser, &["bar\""]);
    assert_eq!(parser.context(), Context::Tag);
    assert_eq!(parser.attribute_value(), Some("foobar"));
    assert!(parser.is_attribute_quoted());
}

#[test]
fn multi_part_namespace_tag() {
    let mut parser = parse(&["<foo:"]);
    assert_eq!(parser.tag_name(), Some("foo:"));
    feed(&mut parser, &["bar"]);
    assert_eq!(parser.tag_name(), Some("foo:bar"));
}

#[test]
fn solidus_after_tag_name() {
    let parser = parse(&["<foo/"]);
    assert_eq!(parser.tag_name(), Some("foo"));
    assert_eq!(parser.context(), Context::TagEnd);
}

#[test]
fn whitespace_after_tag_name() {
    let parser = parse(&["<foo "]);
    assert_eq!(parser.tag_name(), Some("foo"));
    assert_eq!(parser.context(), Context::Tag);
}

#[test]
fn context_is_tag_name_just_after_solidus() {
    let parser = parse(&["</"]);
    assert_eq!(parser.context(), Context::TagName);
    assert!(parser.is_closing_tag());
    assert_eq!(parser.tag_name(), None);
}

#[test]
fn close_tag() {
    let parser = parse(&["<div", ">"]);
    assert_eq!(parser.context(), Context::None);
}

#[test]
fn attribute_name() {
    let mut parser = parse(&["<div foo"]);
    assert_eq!(parser.tag_name(), Some("div"));
    assert_eq!(parser.context(), Context::AttributeName);
    assert_eq!(parser.attribute_name(), Some("foo"));
    feed(&mut parser, &["bla"]);
    assert_eq!(parser.attribute_name(), Some("foobla"));
}

#[test]
fn attribute_name_and_close() {
    let parser = parse(&["<div foo>"]);
    assert_eq!(parser.tag_name(), Some("div"));
    assert_eq!(parser.attribute_name(), Some("foo"));
    assert_eq!(parser.attribute_value(), None);
    assert_eq!(parser.context(), Context::None);
}

#[test]
fn attribute_solidus_close() {
    let parser = parse(&["<div foo/>"]);
    assert_eq!(parser.tag_name(), Some("div"));
    assert_eq!(parser.attribute_name(), Some("foo"));
    assert_eq!(parser.attribute_value(), None);
    assert_eq!(parser.context(), Context::None);
    assert!(!parser.is_closing_tag());
    assert!(parser.is_self_closing_tag());
}

#[test]
fn attribute_value_solidus_close() {
    let parser = parse(&["<div 'foo'/>"]);
    assert_eq!(parser.tag_name(), Some("div"));
    assert_eq!(parser.attribute_name(), None);
    assert_eq!(parser.attribute_value(), Some("foo"));
    assert!(parser.is_attribute_quoted());
    assert_eq!(parser.context(), Context::None);
    assert!(!parser.is_closing_tag());
    assert!(parser.is_self_closing_tag());
}

#[test]
fn attribute_value_and_tag_close() {
    let parser = parse(&["<div \"foo\">"]);
    assert_eq!(parser.tag_name(), Some("div"));
    assert_eq!(parser.attribute_name(), None);
    assert_eq!(parser.attribute_value(), Some("foo"));
    assert!(parser.is_attribute_quoted());
    assert_eq!(parser.context(), Context::None);
    assert!(!parser.is_closing_tag());
    assert!(!parser.is_self_closing_tag());
}

#[test]
fn attribute_value_equal_and_tag_close() {
    let parser = parse(&["<div foo=>"]);
    assert_eq!(parser.tag_name(), Some("div"));
    assert_eq!(parser.attribute_name(), Some("foo"));
    assert_eq!(parser.attribute_value(), None);
    assert_eq!(parser.context(), Context::None);
    assert!(!parser.is_closing_tag());
    assert!(!parser.is_self_closing_tag());
}

#[test]
fn attribute_value_open_quote() {
    let parser = parse(&["<div '"]);
    assert_eq!(parser.attribute_name(), None);
    assert_eq!(parser.attribute_value(), None);
    assert!(parser.is_attribute_quoted());
    assert_eq!(parser.context(), Context::QuotedValue);
}

#[test]
fn attribute_name_and_value_open_quote() {
    let parser = parse(&["<div foo='"]);
    assert_eq!(parser.attribute_name(), Some("foo"));
    assert_eq!(parser.attribute_value(), None);
    assert!(parser.is_attribute_quoted());
    assert_eq!(parser.context(), Context::QuotedValue);
}

#[test]
fn attribute_value_open() {
    let parser = parse(&["<div foo="]);
    assert_eq!(parser.tag_name(), Some("div"));
    assert_eq!(parser.attribute_name(), Some("foo"));
    assert_eq!(parser.attribute_value(), None);
    assert_eq!(parser.context(), Context::AfterEqual);
}

#[test]
fn unquoted_value_may_start_with_solidus() {
    let parser = parse(&["<div foo=/"]);
    assert_eq!(parser.attribute_name(), Some("foo"));
    assert_eq!(parser.attribute_value(), Some("/"));
    assert!(!parser.is_attribute_quoted());
    assert_eq!(parser.context(), Context::UnquotedValue);

    let parser = parse(&["<div foo=/bar"]);
    assert_eq!(parser.attribute_value(), Some("/bar"));
    assert_eq!(parser.context(), Context::UnquotedValue);
}

#[test]
fn solidus_anywhere_doesnt_affect_closing_flags() {
    let parser = parse(&["<div / >"]);
    assert_eq!(parser.tag_name(), Some("div"));
    assert!(!parser.is_closing_tag());
    assert!(!parser.is_self_closing_tag());
}

#[test]
fn solidus_at_beginning_and_end_affect_closing_flags() {
    let parser = parse(&["</div/>"]);
    assert_eq!(parser.tag_name(), Some("div"));
    assert!(parser.is_closing_tag());
    assert!(parser.is_self_closing_tag());
}

#[test]
fn solidus_after_quoted_value_starts_new_attribute() {
    let mut parser = parse(&["<div foo='bar'"]);
    assert_eq!(parser.attribute_name(), Some("foo"));
    assert_eq!(parser.attribute_value(), Some("bar"));
    assert_eq!(parser.context(), Context::Tag);
    feed(&mut parser, &["/baz"]);
    assert_eq!(parser.attribute_name(), Some("baz"));
    assert_eq!(parser.attribute_value(), None);
    assert!(!parser.is_attribute_quoted());
    assert_eq!(parser.context(), Context::AttributeName);
}

#[test]
fn unquoted_value_states() {
    let parser = parse(&["<div foo=bar"]);
    assert_eq!(parser.attribute_name(), Some("foo"));
    assert_eq!(parser.attribute_value(), Some("bar"));
    assert!(!parser.is_attribute_quoted());
    assert_eq!(parser.context(), Context::UnquotedValue);

    let parser = parse(&["<div foo=bar>"]);
    assert_eq!(parser.attribute_value(), Some("bar"));
    assert_eq!(parser.context(), Context::None);
}

#[test]
fn multipart_unquoted_values() {
    let parser = parse(&["<div foo=ba", "r", "/baz"]);
    assert_eq!(parser.attribute_name(), Some("foo"));
    assert_eq!(parser.attribute_value(), Some("bar/baz"));
    assert!(!parser.is_attribute_quoted());
    assert_eq!(parser.context(), Context::UnquotedValue);

    let parser = parse(&["<div foo=ba", "r", "&baz"]);
    assert_eq!(parser.attribute_value(), Some("bar&baz"));
    assert_eq!(parser.context(), Context::UnquotedValue);
}

#[test]
fn space_ends_unquoted_value() {
    let parser = parse(&["<div foo=ba", "r", " baz"]);
    assert_eq!(parser.attribute_name(), Some("baz"));
    assert_eq!(parser.attribute_value(), None);
    assert!(!parser.is_attribute_quoted());
    assert_eq!(parser.context(), Context::AttributeName);
}

#[test]
fn attribute_name_boundaries() {
    let parser = parse(&["<div foo "]);
    assert_eq!(parser.attribute_name(), Some("foo"));
    assert_eq!(parser.attribute_value(), None);
    assert_eq!(parser.context(), Context::AfterAttributeName);

    let parser = parse(&["<div foo/"]);
    assert_eq!(parser.attribute_name(), Some("foo"));
    assert_eq!(parser.context(), Context::TagEnd);

    let parser = parse(&["<div foo bar"]);
    assert_eq!(parser.attribute_name(), Some("bar"));
    assert_eq!(parser.attribute_value(), None);
    assert_eq!(parser.context(), Context::AttributeName);
}

#[test]
fn whitespace_around_equal() {
    let parser = parse(&["<a href = 'x'"]);
    assert_eq!(parser.attribute_name(), Some("href"));
    assert_eq!(parser.attribute_value(), Some("x"));
    assert_eq!(parser.context(), Context::Tag);
}

#[test]
fn comment_and_cdata_contexts() {
    let parser = parse(&["<!--"]);
    assert_eq!(parser.context(), Context::Comment);
    assert_eq!(parser.comment_text(), None);

    let parser = parse(&["<![CDATA["]);
    assert_eq!(parser.context(), Context::Cdata);
    assert_eq!(parser.cdata_text(), None);
}

#[test]
fn comment_and_cdata_text() {
    let parser = parse(&["<!-- foo"]);
    assert_eq!(parser.context(), Context::Comment);
    assert_eq!(parser.comment_text(), Some(" foo"));

    let parser = parse(&["<![CDATA[ foo"]);
    assert_eq!(parser.context(), Context::Cdata);
    assert_eq!(parser.cdata_text(), Some(" foo"));
}

#[test]
fn multipart_comment_and_cdata() {
    let parser = parse(&["<!-- f", "oo", "bar"]);
    assert_eq!(parser.context(), Context::Comment);
    assert_eq!(parser.comment_text(), Some(" foobar"));

    let parser = parse(&["<![CDATA[ f", "oo", "bar"]);
    assert_eq!(parser.context(), Context::Cdata);
    assert_eq!(parser.cdata_text(), Some(" foobar"));
}

#[test]
fn comment_and_cdata_end() {
    let parser = parse(&["<!-- foo -->"]);
    assert_eq!(parser.context(), Context::None);
    assert_eq!(parser.comment_text(), Some(" foo "));

    let parser = parse(&["<![CDATA[ foo ]]>"]);
    assert_eq!(parser.context(), Context::None);
    assert_eq!(parser.cdata_text(), Some(" foo "));
}

#[test]
fn split_comment_terminator_is_not_comment_text() {
    let parser = parse(&["<!-- foo -", "->"]);
    assert_eq!(parser.context(), Context::None);
    assert_eq!(parser.comment_text(), Some(" foo "));

    let parser = parse(&["<![CDATA[a]", "]", ">"]);
    assert_eq!(parser.context(), Context::None);
    assert_eq!(parser.cdata_text(), Some("a"));
}

#[test]
fn comment_and_cdata_keep_the_previous_tag() {
    let parser = parse(&["<div class=x><!-- c -->"]);
    assert_eq!(parser.context(), Context::None);
    assert_eq!(parser.comment_text(), Some(" c "));
    assert_eq!(parser.tag_name(), Some("div"));
    assert_eq!(parser.attribute_name(), Some("class"));
    assert_eq!(parser.attribute_value(), Some("x"));

    let parser = parse(&["<p a='b'><![CDATA[y]]>"]);
    assert_eq!(parser.cdata_text(), Some("y"));
    assert_eq!(parser.tag_name(), Some("p"));
    assert_eq!(parser.attribute_value(), Some("b"));
    assert!(parser.is_attribute_quoted());
}

#[test]
fn split_opener_keeps_the_previous_tag() {
    let cases: [&[&str]; 4] = [
        &["<p class=x><!-", "-x-->"],
        &["<p class=x><!", "--x-->"],
        &["<p class=x><!", "-", "-x-->"],
        &["<p class=x><!", "[CDATA[x]]>"],
    ];
    for parts in cases {
        let whole = parse(&[&parts.concat()]).snapshot();
        let split = parse(parts).snapshot();
        assert_eq!(split, whole, "{parts:?}");
        assert_eq!(split.tag_name.as_deref(), Some("p"), "{parts:?}");
        assert_eq!(split.attribute_name.as_deref(), Some("class"), "{parts:?}");
        assert_eq!(split.attribute_value.as_deref(), Some("x"), "{parts:?}");
    }
}

#[test]
fn cdata_opener_ignores_case() {
    let parser = parse(&["<![CData[", "x]]>"]);
    assert_eq!(parser.context(), Context::None);
    assert_eq!(parser.cdata_text(), Some("x"));
    assert_eq!(parser.tag_name(), None);
}

#[test]
fn plaintext_never_stops_parsing() {
    let mut parser = parse(&["<plaintext>"]);
    assert_eq!(parser.context(), Context::Rawtext);
    assert_eq!(parser.tag_name(), Some("plaintext"));
    assert_eq!(parser.rawtext_text(), None);

    feed(&mut parser, &["some", "<text"]);
    assert_eq!(parser.context(), Context::Rawtext);
    assert_eq!(parser.rawtext_text(), Some("some<text"));

    feed(&mut parser, &["<plaintext"]);
    assert_eq!(parser.context(), Context::Rawtext);
    assert_eq!(parser.rawtext_text(), Some("some<text<plaintext"));

    feed(&mut parser, &["</plaintext>"]);
    assert_eq!(parser.context(), Context::Rawtext);
    assert_eq!(
        parser.rawtext_text(),
        Some("some<text<plaintext</plaintext>")
    );
}

#[test]
fn rawtext_elements_end_on_their_close_tag() {
    for element in RawTextElement::ALL {
        if !element.has_end_tag() || element == RawTextElement::Script {
            continue;
        }
        let name = element.name();
        let mut parser = parse(&[&format!("<{name}>")]);
        assert_eq!(parser.context(), Context::Rawtext, "{name}");
        assert_eq!(parser.tag_name(), Some(name));
        assert_eq!(parser.rawtext_text(), None);

        feed(&mut parser, &["some", "<text"]);
        assert_eq!(parser.context(), Context::Rawtext, "{name}");
        assert_eq!(parser.rawtext_text(), Some("some<text"));

        feed(&mut parser, &[&format!("<{name}")]);
        assert_eq!(parser.context(), Context::Rawtext, "{name}");
        let expected = format!("some<text<{name}");
        assert_eq!(parser.rawtext_text(), Some(expected.as_str()));

        feed(&mut parser, &[&format!("</{name}")]);
        assert_eq!(parser.context(), Context::TagName, "{name}");
        assert_eq!(parser.rawtext_text(), Some(expected.as_str()));

        feed(&mut parser, &[">"]);
        assert_eq!(parser.context(), Context::None, "{name}");
        assert_eq!(parser.rawtext_text(), Some(expected.as_str()));
    }
}

#[test]
fn script_rawtext() {
    let mut parser = parse(&["<script>data data data"]);
    assert_eq!(parser.context(), Context::Rawtext);
    assert_eq!(parser.tag_name(), Some("script"));
    assert_eq!(parser.rawtext_text(), Some("data data data"));
    feed(&mut parser, &["</script"]);
    assert_eq!(parser.context(), Context::TagName);
    assert_eq!(parser.tag_name(), Some("script"));
    assert!(parser.is_closing_tag());
    feed(&mut parser, &[">"]);
    assert_eq!(parser.context(), Context::None);
}

#[test]
fn rawtext_close_tag_is_case_insensitive_and_split() {
    let parser = parse(&["<STYLE>a{}</st", "YLE>"]);
    assert_eq!(parser.context(), Context::None);
    assert_eq!(parser.tag_name(), Some("stYLE"));
    assert!(parser.is_closing_tag());
    assert_eq!(parser.rawtext_text(), Some("a{}"));
}

#[test]
fn rawtext_close_reopens_when_the_name_continues() {
    let split = parse(&["<script type=x>a</script", "s>b"]);
    assert_eq!(split.context(), Context::Rawtext);
    assert_eq!(split.tag_name(), Some("script"));
    assert!(!split.is_closing_tag());
    assert_eq!(split.attribute_name(), Some("type"));
    assert_eq!(split.attribute_value(), Some("x"));
    assert_eq!(split.rawtext_text(), Some("a</scripts>b"));
    assert_eq!(split.snapshot(), parse(&["<script type=x>a</scripts>b"]).snapshot());
}

#[test]
fn rawtext_close_split_anywhere_matches_whole_parse() {
    let inputs = [
        "<script>a</scriptx>b</script>c",
        "<title></titles></title >",
        "<style>p{}</style</style>",
        "<textarea></textarea<</textarea>x",
    ];
    for input in inputs {
        let whole = parse(&[input]).snapshot();
        for split in 1..input.len() {
            let (head, tail) = input.split_at(split);
            assert_eq!(parse(&[head, tail]).snapshot(), whole, "{head:?} | {tail:?}");
        }
        let bytes: Vec<String> = input.chars().map(String::from).collect();
        let parts: Vec<&str> = bytes.iter().map(String::as_str).collect();
        assert_eq!(parse(&parts).snapshot(), whole, "every byte of {input:?}");
    }
}

#[test]
fn rawtext_close_is_provisional_between_calls() {
    let mut parser = parse(&["<script>", "</scr", "ipt"]);
    assert_eq!(parser.context(), Context::TagName);
    assert_eq!(parser.tag_name(), Some("ipt"));
    assert!(parser.is_closing_tag());
    assert_eq!(parser.rawtext_text(), None);

    feed(&mut parser, &["x"]);
    assert_eq!(parser.context(), Context::Rawtext);
    assert_eq!(parser.tag_name(), Some("script"));
    assert!(!parser.is_closing_tag());
    assert_eq!(parser.rawtext_text(), Some("</scriptx"));
}

#[test]
fn consecutive_scripts() {
    let parser = parse(&["<script>foo\n</script>\n<script>bar</script>\n bla"]);
    assert_eq!(parser.context(), Context::None);
}

#[test]
fn end_of_script_regression() {
    let parser = parse(&["<script><!</script>"]);
    assert_eq!(parser.context(), Context::None);
    assert_eq!(parser.rawtext_text(), Some("<!"));
}

#[test]
fn doctype_is_a_bang_tag() {
    let parser = parse(&["<!DOCTYPE html>"]);
    assert_eq!(parser.context(), Context::None);
    assert_eq!(parser.tag_name(), Some("!DOCTYPE"));
    assert_eq!(parser.attribute_name(), Some("html"));
}

#[test]
fn lt_split_from_tag_name() {
    let parser = parse(&["x <", "/b>"]);
    assert_eq!(parser.context(), Context::None);
    assert_eq!(parser.tag_name(), Some("b"));
    assert!(parser.is_closing_tag());
}

#[test]
fn document_length_accumulates() {
    let mut parser = Parser::new();
    assert_eq!(parser.document_len(), 0);
    feed(&mut parser, &["abcdef"]);
    assert_eq!(parser.document_len(), 6);
    feed(&mut parser, &["abcdef"]);
    assert_eq!(parser.document_len(), 12);
}

#[test]
fn document_concatenates_chunks() {
    let mut parser = Parser::new();
    assert_eq!(parser.document(), "");
    feed(&mut parser, &["abcdef"]);
    assert_eq!(parser.document(), "abcdef");
    feed(&mut parser, &["abcdef"]);
    assert_eq!(parser.document(), "abcdefabcdef");
    assert_eq!(
        parser.extract(0, parser.document_len()),
        Ok(parser.document())
    );
}

#[test]
fn visitor_receives_chunk_local_tokens() {
    let mut parser = parse(&["<p>"]);
    let mut tokens = Vec::new();
    parser.parse_with("<foo>", |token| {
        tokens.push((token.kind, token.start, token.end));
    });
    assert_eq!(
        tokens,
        vec![(TokenKind::TagStart, 0, 4), (TokenKind::TagEnd, 4, 5)]
    );
    assert_eq!(parser.tag_name(), Some("foo"));
}

#[test]
fn extract_method() {
    let parser = parse(&["abcdefg"]);
    assert_eq!(parser.extract(0, 1), Ok("a"));
    assert_eq!(parser.extract(2, 4), Ok("cd"));
}

#[test]
fn extract_end_past_length() {
    let parser = parse(&["abcdefg"]);
    let err = parser.extract(0, 32).unwrap_err();
    assert_eq!(err.to_string(), "'end' argument not in range of document");
}

#[test]
fn extract_end_less_than_start() {
    let parser = parse(&["abcdefg"]);
    let err = parser.extract(1, 0).unwrap_err();
    assert_eq!(err, ExtractError::EndBeforeStart { start: 1, end: 0 });
    assert_eq!(
        err.to_string(),
        "'end' must be greater or equal than 'start'"
    );
}

#[test]
fn snapshot_captures_all_queries() {
    let parser = parse(&["<a href='x' "]);
    let snapshot = parser.snapshot();
    assert_eq!(snapshot.context, Context::Tag);
    assert_eq!(snapshot.tag_name.as_deref(), Some("a"));
    assert_eq!(snapshot.attribute_name.as_deref(), Some("href"));
    assert_eq!(snapshot.attribute_value.as_deref(), Some("x"));
    assert!(snapshot.attribute_quoted);
    assert!(!snapshot.closing_tag);
    assert_eq!(snapshot.comment_text, None);
}

#[test]
fn push_bytes_reassembles_split_characters() {
    let input = "<p title='é'>😀</p>".as_bytes();
    let mut whole = Parser::new();
    whole.push_bytes(input).unwrap();
    whole.finish().unwrap();
    for split in 1..input.len() {
        let mut parser = Parser::new();
        parser.push_bytes(&input[..split]).unwrap();
        parser.push_bytes(&input[split..]).unwrap();
        parser.finish().unwrap();
        assert_eq!(parser.document(), whole.document(), "split at {split}");
        assert_eq!(parser.snapshot(), whole.snapshot(), "split at {split}");
    }
}

#[test]
fn lossy_bytes_replace_invalid_sequences() {
    let mut parser = Parser::new();
    parser.push_bytes(b"<a b='\xFF'>\xE2\x82").unwrap();
    parser.finish().unwrap();
    assert_eq!(parser.document(), "<a b='\u{FFFD}'>\u{FFFD}");
    assert_eq!(parser.attribute_value(), Some("\u{FFFD}"));
}

#[test]
fn strict_bytes_report_location() {
    let mut parser = Parser::with_config(ParserConfig {
        utf8: Utf8Policy::Strict,
    });
    parser.push_bytes(b"<div>\n  <p>").unwrap();
    let err = parser.push_bytes(b"ok\xFFrest").unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 8);
    assert_eq!(err.message, "invalid UTF-8 sequence [ff]");
    assert_eq!(parser.document(), "<div>\n  <p>ok");
}

#[test]
fn strict_finish_reports_truncated_input() {
    let mut parser = Parser::with_config(ParserConfig {
        utf8: Utf8Policy::Strict,
    });
    parser.push_bytes(b"ab\xF0\x9F").unwrap();
    let err = parser.finish().unwrap_err();
    assert_eq!((err.line, err.column), (1, 3));
    assert!(err.message.starts_with("incomplete UTF-8 sequence"));
}

#[test]
fn stats_track_chunks_and_bytes() {
    let parser = parse(&["<a>", "b", "</a>"]);
    let stats = parser.stats();
    assert_eq!(stats.chunks, 3);
    assert_eq!(stats.bytes, 8);
    assert_eq!(stats.tokenizer.chunks, 3);
}
