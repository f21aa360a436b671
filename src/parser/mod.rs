//! GCode line parsing
//!
//! Per-line helpers used by the interpreter: numeric code extraction and
//! comment classification. Neither keeps any state between lines.

pub mod annotation;
pub mod tokenizer;

pub use annotation::{classify_line, Annotation, COMMENT_START, LAYER_MARKER, TYPE_PREFIX};
pub use tokenizer::Tokenizer;
