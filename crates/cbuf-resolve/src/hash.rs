//! Struct fingerprinting.
//!
//! Every struct gets a 64-bit identity: a djb2-style rolling hash of its
//! canonical text. The canonical text is whitespace-exact — a trailing
//! space before each newline — because the hash is the on-wire type
//! identifier and both endpoints must derive the same value:
//!
//! ```text
//! struct <name> \n
//! [<fixed-len-or-0>] <element> <field>; \n      (array fields)
//! <element> <field>; \n                          (scalar fields)
//! ```
//!
//! `<element>` is the C spelling for primitives (`VString<N-1>` for
//! bounded strings) and the decimal hash of the nested struct for complex
//! fields, computed recursively. The recursion requires an acyclic
//! reference graph; cycles are detected and reported. Enums never appear
//! (references were rewritten to `uint32`) and carry hash 0 themselves.

use std::collections::{HashMap, HashSet};

use cbuf_ast::schema::{ArrayKind, FieldDef, FieldKind, Primitive};
use cbuf_ast::TypeDef;

use crate::error::{CompileError, ErrorKind};
use crate::index::SchemaByName;
use crate::names::{candidate_names, resolve_name};

/// djb2 over the canonical text, 64-bit wrapping.
pub fn hash_text(text: &str) -> u64 {
    text.bytes()
        .fold(5381u64, |hash, byte| {
            hash.wrapping_shl(5).wrapping_add(hash).wrapping_add(u64::from(byte))
        })
}

/// Fill in `hash` for every entity in `defs`.
///
/// Structs are hashed recursively with memoization; enums stay at 0.
pub fn compute_hashes(defs: &mut [TypeDef]) -> Result<(), CompileError> {
    let name_to_idx: HashMap<String, usize> = defs
        .iter()
        .enumerate()
        .map(|(idx, def)| (def.qualified_name.clone(), idx))
        .collect();

    let mut memo: Vec<Option<u64>> = vec![None; defs.len()];
    let mut visiting = vec![false; defs.len()];
    for idx in 0..defs.len() {
        hash_of(defs, &name_to_idx, idx, &mut memo, &mut visiting)?;
    }

    for (idx, def) in defs.iter_mut().enumerate() {
        def.hash = memo[idx].unwrap_or(0);
    }
    Ok(())
}

fn hash_of(
    defs: &[TypeDef],
    name_to_idx: &HashMap<String, usize>,
    idx: usize,
    memo: &mut Vec<Option<u64>>,
    visiting: &mut Vec<bool>,
) -> Result<u64, CompileError> {
    if let Some(hash) = memo[idx] {
        return Ok(hash);
    }
    let def = &defs[idx];
    if def.is_enum {
        memo[idx] = Some(0);
        return Ok(0);
    }
    if visiting[idx] {
        return Err(CompileError::spanless(
            ErrorKind::CyclicSchema,
            format!("struct '{}' is part of a reference cycle", def.qualified_name),
        ));
    }
    visiting[idx] = true;

    let mut text = format!("struct {} \n", def.name);
    for field in &def.fields {
        let element = match &field.kind {
            FieldKind::Primitive(p) => element_spelling(*p, field),
            FieldKind::Complex(type_name) => {
                let child = candidate_names(&def.namespaces, type_name)
                    .iter()
                    .find_map(|key| name_to_idx.get(key).copied())
                    .ok_or_else(|| {
                        CompileError::spanless(
                            ErrorKind::UnknownType,
                            format!(
                                "field '{}' of '{}' references unknown type '{}'",
                                field.name, def.qualified_name, type_name
                            ),
                        )
                    })?;
                hash_of(defs, name_to_idx, child, memo, visiting)?.to_string()
            }
        };
        push_field_line(&mut text, field, &element);
    }

    visiting[idx] = false;
    let hash = hash_text(&text);
    memo[idx] = Some(hash);
    Ok(hash)
}

/// Hash a struct on demand through the schema maps.
///
/// Recomputes the canonical text from scratch (it does not trust the
/// stored hash), resolving `type_name` and every nested reference through
/// the namespace walk. Enums hash to 0.
pub fn compute_hash_value(
    map: &SchemaByName,
    namespaces: &[String],
    type_name: &str,
) -> Result<u64, CompileError> {
    let def = resolve_name(map, namespaces, type_name).ok_or_else(|| {
        CompileError::spanless(
            ErrorKind::UnknownType,
            format!("unknown type '{}'", type_name),
        )
    })?;
    let mut visiting = HashSet::new();
    hash_via_map(map, def, &mut visiting)
}

fn hash_via_map(
    map: &SchemaByName,
    def: &TypeDef,
    visiting: &mut HashSet<String>,
) -> Result<u64, CompileError> {
    if def.is_enum {
        return Ok(0);
    }
    if !visiting.insert(def.qualified_name.clone()) {
        return Err(CompileError::spanless(
            ErrorKind::CyclicSchema,
            format!("struct '{}' is part of a reference cycle", def.qualified_name),
        ));
    }

    let mut text = format!("struct {} \n", def.name);
    for field in &def.fields {
        let element = match &field.kind {
            FieldKind::Primitive(p) => element_spelling(*p, field),
            FieldKind::Complex(type_name) => {
                let child = resolve_name(map, &def.namespaces, type_name).ok_or_else(|| {
                    CompileError::spanless(
                        ErrorKind::UnknownType,
                        format!(
                            "field '{}' of '{}' references unknown type '{}'",
                            field.name, def.qualified_name, type_name
                        ),
                    )
                })?;
                hash_via_map(map, child, visiting)?.to_string()
            }
        };
        push_field_line(&mut text, field, &element);
    }

    visiting.remove(&def.qualified_name);
    Ok(hash_text(&text))
}

/// Canonical element spelling for a primitive field.
fn element_spelling(prim: Primitive, field: &FieldDef) -> String {
    match (prim, field.upper_bound) {
        (Primitive::String, Some(bound)) => format!("VString<{}>", bound - 1),
        _ => prim.c_spelling().to_owned(),
    }
}

/// Append one canonical field line, array prefix included.
fn push_field_line(text: &mut String, field: &FieldDef, element: &str) {
    if let Some(array) = field.array {
        let len = match array {
            ArrayKind::Fixed(n) => n,
            ArrayKind::Bounded(_) | ArrayKind::Dynamic => 0,
        };
        text.push_str(&format!("[{}] ", len));
    }
    text.push_str(&format!("{} {}; \n", element, field.name));
}
