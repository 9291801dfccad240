//! Semantic analysis, hashing, and schema indexing for cbuf.
//!
//! The back half of the schema front-end. [`compile_schemas`] takes the
//! parser's raw declarations through:
//!
//! 1. `analyze` — scoping, duplicate detection, enum rewriting, default
//!    typing
//! 2. `hash` — canonical-text hashing of every struct (the on-wire type
//!    identity)
//!
//! and yields the shared entity list. `index` builds the read-only lookup
//! maps the codec works against, and `names` holds the one namespace walk
//! every stage resolves type references with.

pub mod analyze;
pub mod error;
pub mod hash;
pub mod index;
pub mod names;

pub use error::{CompileError, ErrorKind};
pub use hash::{compute_hash_value, hash_text};
pub use index::{create_schema_maps, SchemaByHash, SchemaByName};
pub use names::{candidate_names, resolve_name};

use std::sync::Arc;

use cbuf_ast::{Declaration, TypeDef};

/// Analyze and hash raw declarations into the compiled schema list.
pub fn compile_schemas(decls: &[Declaration]) -> Result<Vec<Arc<TypeDef>>, CompileError> {
    let mut defs = analyze::analyze(decls)?;
    hash::compute_hashes(&mut defs)?;
    Ok(defs.into_iter().map(Arc::new).collect())
}
