//! CSS engine: tokenizer, parser, style values, specificity, cascade.

pub mod cascade;
pub mod color;
pub mod model;
pub mod parser;
pub mod properties;
pub mod scalar;
pub mod selector;
pub mod specificity;
pub mod styles;
pub mod tokenizer;

pub use cascade::{Cascade, BUILTIN_CSS};
pub use parser::{parse_css, parse_stylesheet, ParseError};
pub use specificity::{CascadeOrder, Origin};
pub use styles::Styles;
