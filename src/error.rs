use thiserror::Error;

pub type EdnResult<T> = Result<T, EdnError>;

/// Longest input prefix quoted back in an error message.
const FRAGMENT_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum EdnError {
    #[error("Unmatched closing delimiter '{found}' (open: {open})")]
    UnmatchedDelimiter { found: char, open: &'static str },

    #[error("Unterminated {kind} at end of input")]
    UnterminatedCollection { kind: &'static str },

    #[error("Collections nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("Map literal must contain an even number of forms")]
    OddMapForms,

    #[error("Tag #{tag} has no associated value")]
    DanglingTag { tag: String },

    #[error("Two tags in a row: #{first} #{second}")]
    ConsecutiveTags { first: String, second: String },

    #[error("Tag #{tag} cannot be applied to numeric literal {literal}")]
    TaggedNumber { tag: String, literal: String },

    #[error("Tag transformer for #{tag} failed: {source}")]
    Transform {
        tag: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid character literal: \\{name}")]
    InvalidCharacter { name: String },

    #[error("Character literal \\c is not supported")]
    UnsupportedCharacter,

    #[error("Invalid number: {text}")]
    InvalidNumber { text: String },

    #[error("Unterminated string: {fragment}")]
    UnterminatedString { fragment: String },

    #[error("Cannot parse: {fragment}")]
    Unrecognized { fragment: String },

    #[error("Cannot stringify value of type {type_name}")]
    Unsupported { type_name: &'static str },

    #[error("Cannot stringify aliased or recursive data structures")]
    AliasedValue,
}

impl EdnError {
    pub fn unrecognized(rest: &str) -> Self {
        Self::Unrecognized {
            fragment: fragment(rest),
        }
    }

    pub fn unterminated_string(rest: &str) -> Self {
        Self::UnterminatedString {
            fragment: fragment(rest),
        }
    }

    pub fn invalid_number(text: impl Into<String>) -> Self {
        Self::InvalidNumber { text: text.into() }
    }

    pub fn transform(tag: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Transform {
            tag: tag.into(),
            source: source.into(),
        }
    }

    pub fn unsupported(type_name: &'static str) -> Self {
        Self::Unsupported { type_name }
    }
}

fn fragment(rest: &str) -> String {
    let mut chars = rest.chars();
    let mut fragment: String = chars.by_ref().take(FRAGMENT_LEN).collect();
    if chars.next().is_some() {
        fragment.push_str("...");
    }
    fragment
}
