//! Reader and writer for EDN (Extensible Data Notation).
//!
//! [`parse`] reads a document into an [`EdnValue`] list holding its top-level
//! forms. Tagged elements are handed to [`TagTransformers`]; the built-in
//! `#inst` turns an ISO-8601 string into epoch milliseconds. [`stringify`]
//! writes a value tree back out in a compact, lossy form.
//!
//! ```
//! use ednr::{parse, EdnValue};
//!
//! let forms = parse("{:a 1} #inst \"1970-01-01T00:00:01Z\"").unwrap();
//! assert_eq!(forms.get(&EdnValue::Integer(1)), Some(&EdnValue::Instant(1000)));
//! ```

pub mod edn;
pub mod error;
pub mod primitives;

pub use edn::{stringify, EdnValue, Parser, TagTransformers};
pub use error::{EdnError, EdnResult};

/// Parse `text` with only the built-in tag transformers.
pub fn parse(text: &str) -> EdnResult<EdnValue> {
    parse_with(text, &TagTransformers::default())
}

/// Parse `text`, consulting `transformers` for tagged elements.
pub fn parse_with(text: &str, transformers: &TagTransformers) -> EdnResult<EdnValue> {
    Parser::new(text, transformers).parse()
}
