//! Preprocessing and parsing for cbuf schema sources.
//!
//! Two stages live here, matching the front half of the pipeline:
//!
//! 1. [`preprocess`] — strip comments, splice `#import`s (the only stage
//!    aware of imports; file contents are supplied by the caller).
//! 2. [`parse_declarations`] — tokenize and parse into raw
//!    [`Declaration`](cbuf_ast::Declaration)s.
//!
//! Semantic analysis (namespacing, enum rewriting, validation) is the
//! `cbuf-resolve` crate's job; nothing here looks across declarations.

pub mod preprocess;

mod parser;

pub use parser::{parse_declarations, ParseError, ParseErrorKind};
pub use preprocess::{preprocess, PreprocessError};
