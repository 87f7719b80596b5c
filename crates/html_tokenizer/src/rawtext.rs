//! Elements whose content is not tokenized as markup.

/// The fixed rawtext element set.
///
/// After the start tag of one of these closes, everything up to the matching
/// `</name` is literal text. `Plaintext` never ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RawTextElement {
    Script,
    Style,
    Textarea,
    Title,
    Xmp,
    Iframe,
    Noembed,
    Noframes,
    Plaintext,
}

impl RawTextElement {
    pub const ALL: [RawTextElement; 9] = [
        RawTextElement::Script,
        RawTextElement::Style,
        RawTextElement::Textarea,
        RawTextElement::Title,
        RawTextElement::Xmp,
        RawTextElement::Iframe,
        RawTextElement::Noembed,
        RawTextElement::Noframes,
        RawTextElement::Plaintext,
    ];

    /// Longest name in the set, in bytes.
    pub const MAX_NAME_LEN: usize = 9;

    pub fn name(self) -> &'static str {
        match self {
            RawTextElement::Script => "script",
            RawTextElement::Style => "style",
            RawTextElement::Textarea => "textarea",
            RawTextElement::Title => "title",
            RawTextElement::Xmp => "xmp",
            RawTextElement::Iframe => "iframe",
            RawTextElement::Noembed => "noembed",
            RawTextElement::Noframes => "noframes",
            RawTextElement::Plaintext => "plaintext",
        }
    }

    /// ASCII case-insensitive lookup.
    pub fn from_name(name: &[u8]) -> Option<RawTextElement> {
        if name.len() > Self::MAX_NAME_LEN {
            return None;
        }
        RawTextElement::ALL
            .into_iter()
            .find(|element| element.name().as_bytes().eq_ignore_ascii_case(name))
    }

    /// Whether a closing tag can end this element's content.
    pub fn has_end_tag(self) -> bool {
        self != RawTextElement::Plaintext
    }
}
