//! Schema lookup maps.
//!
//! Two maps are built together from one parse result and are read-only
//! thereafter: name → entity (every entity, keyed by fully qualified name,
//! declaration order preserved) and hash → entity (structs only — enums
//! carry hash 0 and are never on the wire). Both maps share the same
//! `Arc`s, so an entity looked up either way is the same object.

use std::collections::HashMap;
use std::sync::Arc;

use cbuf_ast::TypeDef;
use indexmap::IndexMap;

/// Fully qualified name → entity, in declaration order.
pub type SchemaByName = IndexMap<String, Arc<TypeDef>>;

/// Struct hash → entity. Enums are excluded.
pub type SchemaByHash = HashMap<u64, Arc<TypeDef>>;

/// Build the name and hash lookup maps for a compiled schema list.
pub fn create_schema_maps(schemas: &[Arc<TypeDef>]) -> (SchemaByName, SchemaByHash) {
    let mut by_name = SchemaByName::new();
    let mut by_hash = SchemaByHash::new();

    for def in schemas {
        by_name.insert(def.qualified_name.clone(), Arc::clone(def));
        if !def.is_enum {
            by_hash.insert(def.hash, Arc::clone(def));
        }
    }

    (by_name, by_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str, hash: u64, is_enum: bool) -> Arc<TypeDef> {
        let mut def = TypeDef::new_struct(name, Vec::new());
        def.hash = hash;
        def.is_enum = is_enum;
        Arc::new(def)
    }

    #[test]
    fn test_maps_share_entities() {
        let defs = vec![entity("a", 77, false)];
        let (by_name, by_hash) = create_schema_maps(&defs);
        let from_name = by_name.get("a").unwrap();
        let from_hash = by_hash.get(&77).unwrap();
        assert!(Arc::ptr_eq(from_name, from_hash));
    }

    #[test]
    fn test_enums_excluded_from_hash_map() {
        let defs = vec![entity("a", 77, false), entity("e", 0, true)];
        let (by_name, by_hash) = create_schema_maps(&defs);
        assert_eq!(by_name.len(), 2);
        assert_eq!(by_hash.len(), 1);
        assert!(!by_hash.contains_key(&0));
    }

    #[test]
    fn test_name_map_preserves_declaration_order() {
        let defs = vec![entity("z", 1, false), entity("a", 2, false)];
        let (by_name, _) = create_schema_maps(&defs);
        let keys: Vec<_> = by_name.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
