//! # cbuf
//!
//! Schema compiler and binary codec for the cbuf interface definition
//! language.
//!
//! This crate is a facade that re-exports functionality from:
//! - `cbuf-ast` — schema model and message value types
//! - `cbuf-lexer` — tokenization
//! - `cbuf-parser` — preprocessing and parsing
//! - `cbuf-resolve` — semantic analysis, hashing, schema indexing
//! - `cbuf-codec` — binary serialization and deserialization
//!
//! ## Pipeline
//!
//! ```text
//! source text
//!     ↓ preprocess      (comments stripped, #imports spliced)
//!     ↓ parse           (lex → declarations → analysis → hashes)
//! schema list
//!     ↓ create_schema_maps
//! name map + hash map
//!     ↓ serialize_message / deserialize_message
//! framed bytes ↔ message records
//! ```
//!
//! ## Usage
//!
//! ```
//! use cbuf::{FieldValue, MessageRecord};
//!
//! let schemas = cbuf::parse("struct a { string b; bool c; }").unwrap();
//! let (by_name, by_hash) = cbuf::create_schema_maps(&schemas);
//!
//! let mut message = cbuf::MessageFields::new();
//! message.insert("b".to_owned(), FieldValue::Str("Hello, world!".to_owned()));
//! message.insert("c".to_owned(), FieldValue::Bool(true));
//!
//! let msg = MessageRecord::new("a", 0.0, message);
//! let bytes = cbuf::serialize_message(&by_name, &msg).unwrap();
//! let back = cbuf::deserialize_message(&by_name, &by_hash, &bytes, 0).unwrap();
//! assert_eq!(back.message, msg.message);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

// Re-export the model
pub use cbuf_ast::{
    ArrayKind, Declaration, FieldDef, FieldKind, FieldValue, Literal, MessageFields,
    MessageRecord, Primitive, TypeDef,
};

// Re-export the pipeline crates
pub use cbuf_codec as codec;
pub use cbuf_lexer as lexer;
pub use cbuf_parser as parser;
pub use cbuf_resolve as resolve;

pub use cbuf_codec::{CodecError, HEADER_SIZE, MAGIC, METADATA_HASH, METADATA_TYPE_NAME};
pub use cbuf_parser::{ParseError, ParseErrorKind, PreprocessError};
pub use cbuf_resolve::{CompileError, ErrorKind, SchemaByHash, SchemaByName};

/// Any failure across the pipeline. Each operation reports exactly one.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Strip comments and splice `#import`s into one self-contained text.
///
/// `imports` maps import paths to their source text; the library performs
/// no file I/O of its own.
pub fn preprocess(text: &str, imports: &HashMap<String, String>) -> Result<String, Error> {
    Ok(cbuf_parser::preprocess(text, imports)?)
}

/// Parse preprocessed schema text into the compiled schema list.
///
/// Runs the full front half of the pipeline: lexing, parsing, semantic
/// analysis, and hash computation.
pub fn parse(text: &str) -> Result<Vec<Arc<TypeDef>>, Error> {
    let decls = cbuf_parser::parse_declarations(text)?;
    Ok(cbuf_resolve::compile_schemas(&decls)?)
}

/// Build the name→schema and hash→schema lookup maps.
pub fn create_schema_maps(schemas: &[Arc<TypeDef>]) -> (SchemaByName, SchemaByHash) {
    cbuf_resolve::create_schema_maps(schemas)
}

/// Hash a struct on demand, resolving `type_name` from within `namespaces`.
pub fn compute_hash_value(
    by_name: &SchemaByName,
    namespaces: &[String],
    type_name: &str,
) -> Result<u64, Error> {
    Ok(cbuf_resolve::compute_hash_value(by_name, namespaces, type_name)?)
}

/// Exact framed size of `msg` in bytes.
pub fn serialized_message_size(by_name: &SchemaByName, msg: &MessageRecord) -> Result<usize, Error> {
    Ok(cbuf_codec::serialized_message_size(by_name, msg)?)
}

/// Serialize `msg` into framed bytes.
pub fn serialize_message(by_name: &SchemaByName, msg: &MessageRecord) -> Result<Vec<u8>, Error> {
    Ok(cbuf_codec::serialize_message(by_name, msg)?)
}

/// Decode one framed message from `bytes` starting at `offset`.
pub fn deserialize_message(
    by_name: &SchemaByName,
    by_hash: &SchemaByHash,
    bytes: &[u8],
    offset: usize,
) -> Result<MessageRecord, Error> {
    Ok(cbuf_codec::deserialize_message(by_name, by_hash, bytes, offset)?)
}
