//! Caller-visible parsing context.

use std::fmt;

/// Where the parser stands between two `parse` calls.
///
/// Coarser than the tokenizer's machine state; `None` is both the initial
/// state and the state between constructs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Context {
    #[default]
    None,
    TagName,
    Tag,
    AttributeName,
    AfterAttributeName,
    AfterEqual,
    QuotedValue,
    UnquotedValue,
    TagEnd,
    Comment,
    Cdata,
    Rawtext,
}

impl Context {
    pub const ALL: [Context; 12] = [
        Context::None,
        Context::TagName,
        Context::Tag,
        Context::AttributeName,
        Context::AfterAttributeName,
        Context::AfterEqual,
        Context::QuotedValue,
        Context::UnquotedValue,
        Context::TagEnd,
        Context::Comment,
        Context::Cdata,
        Context::Rawtext,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Context::None => "none",
            Context::TagName => "tag_name",
            Context::Tag => "tag",
            Context::AttributeName => "attribute_name",
            Context::AfterAttributeName => "after_attribute_name",
            Context::AfterEqual => "after_equal",
            Context::QuotedValue => "quoted_value",
            Context::UnquotedValue => "unquoted_value",
            Context::TagEnd => "tag_end",
            Context::Comment => "comment",
            Context::Cdata => "cdata",
            Context::Rawtext => "rawtext",
        }
    }

    pub fn from_name(name: &str) -> Option<Context> {
        Context::ALL.into_iter().find(|context| context.as_str() == name)
    }

    /// Collapse to the older three-way tag vocabulary.
    pub fn coarse(self) -> CoarseContext {
        match self {
            Context::None => CoarseContext::None,
            Context::TagName | Context::Tag | Context::TagEnd => CoarseContext::Tag,
            Context::AttributeName | Context::AfterAttributeName | Context::AfterEqual => {
                CoarseContext::Attribute
            }
            Context::QuotedValue | Context::UnquotedValue => CoarseContext::AttributeValue,
            Context::Comment => CoarseContext::Comment,
            Context::Cdata => CoarseContext::Cdata,
            Context::Rawtext => CoarseContext::Rawtext,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoarseContext {
    None,
    Tag,
    Attribute,
    AttributeValue,
    Comment,
    Cdata,
    Rawtext,
}

impl CoarseContext {
    pub fn as_str(self) -> &'static str {
        match self {
            CoarseContext::None => "none",
            CoarseContext::Tag => "tag",
            CoarseContext::Attribute => "attribute",
            CoarseContext::AttributeValue => "attribute_value",
            CoarseContext::Comment => "comment",
            CoarseContext::Cdata => "cdata",
            CoarseContext::Rawtext => "rawtext",
        }
    }
}

impl fmt::Display for CoarseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
