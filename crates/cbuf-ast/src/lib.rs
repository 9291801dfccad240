//! Schema model for the cbuf interface definition language.
//!
//! This crate holds the types shared by every stage of the pipeline:
//!
//! - `schema` — primitive type tags, field and entity definitions, literals
//! - `decl` — raw declarations as produced by the parser, before analysis
//! - `value` — runtime field values and the framed message record
//!
//! The model is deliberately plain data: no behavior beyond classification
//! helpers lives here. Parsing, analysis, hashing, and the codec are all
//! separate crates that consume these types.

pub mod decl;
pub mod schema;
pub mod value;

pub use decl::{ConstDecl, Declaration, EnumDecl, EnumMember, NamespaceDecl, RawField, RawType, StructDecl};
pub use schema::{ArrayKind, FieldDef, FieldKind, Literal, Primitive, TypeDef};
pub use value::{FieldValue, MessageFields, MessageRecord};

/// Byte range into the preprocessed source text.
///
/// Spans always refer to the text handed to the parser, i.e. after the
/// preprocessor has stripped comments and spliced imports.
pub type Span = std::ops::Range<usize>;
