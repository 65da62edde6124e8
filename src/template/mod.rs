//! Template mini-language
//!
//! - [`parser`] - line state machine producing [`ElementSpec`]s
//! - [`format`] - `%s` placeholder substitution
//! - [`source`] - where template lines come from

pub mod format;
pub mod parser;
pub mod source;

pub use parser::{parse, parse_line, ElementSpec, InputSpec, TextSpec};
pub use source::{Template, TemplateSource};
