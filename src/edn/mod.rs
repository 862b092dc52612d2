pub mod instant;
pub mod lexer;
pub mod parser;
pub mod tags;
pub mod value;
pub mod writer;

pub use parser::{Parser, MAX_DEPTH};
pub use tags::TagTransformers;
pub use value::EdnValue;
pub use writer::stringify;
