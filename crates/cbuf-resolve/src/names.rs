//! Namespaced name resolution.
//!
//! One walk is the single source of truth for every lookup in the library
//! (enum detection during analysis, nested hashes, codec struct refs): a
//! name that already contains `::` is looked up directly; an unqualified
//! name is tried under the namespace stack deepest-first, down to the bare
//! name, first hit wins.

use std::sync::Arc;

use cbuf_ast::schema::qualify;
use cbuf_ast::TypeDef;

use crate::index::SchemaByName;

/// The qualified keys under which `name` may resolve, in probe order.
pub fn candidate_names(namespaces: &[String], name: &str) -> Vec<String> {
    if name.contains("::") {
        return vec![name.to_owned()];
    }
    (0..=namespaces.len())
        .rev()
        .map(|depth| qualify(&namespaces[..depth], name))
        .collect()
}

/// Resolve a type reference made from within `namespaces`.
pub fn resolve_name<'a>(
    map: &'a SchemaByName,
    namespaces: &[String],
    name: &str,
) -> Option<&'a Arc<TypeDef>> {
    candidate_names(namespaces, name)
        .iter()
        .find_map(|key| map.get(key))
}
